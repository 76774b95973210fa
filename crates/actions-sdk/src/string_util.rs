// StringUtil: small string helpers used by the command channel and the
// execution context.

use rand::seq::SliceRandom;

/// Letters a generated token is drawn from.
const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the tokens used to suspend workflow commands.
pub const DEFAULT_TOKEN_LENGTH: usize = 20;

/// String utility functions.
pub struct StringUtil;

impl StringUtil {
    /// Flatten text onto a single log line.
    ///
    /// Carriage returns are dropped and every line feed becomes one space, so
    /// `"a\r\nb"` and `"a\nb"` both yield `"a b"`.
    pub fn newlines_to_spaces(text: &str) -> String {
        text.replace('\r', "").replace('\n', " ")
    }

    /// Split text into lines on `\n`, `\r\n` or a lone `\r`.
    ///
    /// A trailing terminator does not add an empty last line, and empty text
    /// has no lines.
    pub fn split_lines(text: &str) -> Vec<&str> {
        let mut lines = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            match rest.find(&['\r', '\n'][..]) {
                Some(i) => {
                    lines.push(&rest[..i]);
                    let terminator = if rest[i..].starts_with("\r\n") { 2 } else { 1 };
                    rest = &rest[i + terminator..];
                }
                None => {
                    lines.push(rest);
                    break;
                }
            }
        }
        lines
    }

    /// Generate a random string of `length` ASCII letters.
    ///
    /// Not a secret: the value only needs to be unlikely to appear in
    /// regular log output.
    pub fn random_str(length: usize) -> String {
        Self::random_str_with(&mut rand::thread_rng(), length)
    }

    /// [`StringUtil::random_str`] drawing from the given generator.
    pub fn random_str_with<R: rand::Rng + ?Sized>(rng: &mut R, length: usize) -> String {
        (0..length)
            .filter_map(|_| TOKEN_ALPHABET.choose(&mut *rng))
            .map(|&b| b as char)
            .collect()
    }

    /// Case-insensitive comparison against the literal `true`.
    ///
    /// Anything else, including `"1"` or `"yes"`, is `false`.
    pub fn is_true(value: &str) -> bool {
        value.eq_ignore_ascii_case("true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn split_lines() {
        assert!(StringUtil::split_lines("").is_empty());
        assert_eq!(StringUtil::split_lines("one"), vec!["one"]);
        assert_eq!(StringUtil::split_lines("a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
        assert_eq!(StringUtil::split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(StringUtil::split_lines("a\r\r\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn newlines_to_spaces() {
        assert_eq!(StringUtil::newlines_to_spaces(""), "");
        assert_eq!(StringUtil::newlines_to_spaces("SOme text"), "SOme text");
        assert_eq!(StringUtil::newlines_to_spaces("SOme\ntext"), "SOme text");
        assert_eq!(
            StringUtil::newlines_to_spaces("SOme\r\nlong\r\ntext"),
            "SOme long text"
        );
    }

    #[test]
    fn random_str_length_and_alphabet() {
        let token = StringUtil::random_str(DEFAULT_TOKEN_LENGTH);
        assert_eq!(token.len(), 20);
        assert!(token.chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(StringUtil::random_str(5).len(), 5);
        assert_eq!(StringUtil::random_str(0), "");
    }

    #[test]
    fn random_str_is_deterministic_for_a_seed() {
        let a = StringUtil::random_str_with(&mut StdRng::seed_from_u64(7), 12);
        let b = StringUtil::random_str_with(&mut StdRng::seed_from_u64(7), 12);
        assert_eq!(a, b);
    }

    #[test]
    fn is_true() {
        assert!(StringUtil::is_true("true"));
        assert!(StringUtil::is_true("True"));
        assert!(StringUtil::is_true("TRUE"));
        assert!(!StringUtil::is_true("False"));
        assert!(!StringUtil::is_true("SPAM"));
        assert!(!StringUtil::is_true("1"));
        assert!(!StringUtil::is_true(""));
    }
}
