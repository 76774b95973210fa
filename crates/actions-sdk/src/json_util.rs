// JsonUtil: slash-separated lookups into the webhook event payload.

use serde_json::Value;

/// Safe navigation over parsed JSON trees.
pub struct JsonUtil;

impl JsonUtil {
    /// Walk a JSON tree along a slash-separated path of object keys.
    ///
    /// `tree["pull_request"]["head"]["comment"]` style indexing fails loudly
    /// on missing data; `find(tree, "pull_request/head/comment")` returns
    /// `None` instead. Traversal stops with `None` as soon as a node is not an
    /// object or a key is absent.
    ///
    /// A value that is present but falsy (`null`, `false`, `0`, `""`, `[]`,
    /// `{}`) is reported as `None` too: callers treat "empty" and "absent" the
    /// same way.
    pub fn find<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
        let mut node = tree;
        for key in path.split('/') {
            node = node.as_object()?.get(key)?;
        }
        if Self::is_falsy(node) {
            None
        } else {
            Some(node)
        }
    }

    /// Like [`JsonUtil::find`], substituting `default` for a missing or empty value.
    pub fn find_or<'a>(tree: &'a Value, path: &str, default: &'a Value) -> &'a Value {
        Self::find(tree, path).unwrap_or(default)
    }

    /// Whether a value counts as empty.
    pub fn is_falsy(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }
}
