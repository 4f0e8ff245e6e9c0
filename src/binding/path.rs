// ============================================================================
// spark-elements - Path Resolver
// Evaluates `a.b.c` / `a['b']` paths against a root value
// ============================================================================

use crate::core::value::Value;

/// Rewrite the bracket-quote form into dot notation.
///
/// `['` becomes `.` and `']` is dropped, so `user['name']` reads as
/// `user.name`. Nothing else is rewritten; `items[0]` stays a single key.
///
/// # Example
/// ```
/// use spark_elements::normalize_path;
///
/// assert_eq!(normalize_path("a['b'].c"), "a.b.c");
/// assert_eq!(normalize_path("items[0]"), "items[0]");
/// ```
pub fn normalize_path(path: &str) -> String {
    path.replace("['", ".").replace("']", "")
}

/// Resolve `path` against `root`.
///
/// Segments are walked left to right. A step yields `None` when the current
/// value is falsy or does not have the segment as an own or inherited
/// property, and everything after it is skipped. Never panics and never
/// caches.
///
/// # Example
/// ```
/// use spark_elements::{resolve, Value};
/// use serde_json::json;
///
/// let root = Value::from(json!({"a": {"b": {"c": 5}}}));
/// assert_eq!(resolve("a.b.c", &root), Some(Value::from(5)));
/// assert_eq!(resolve("a.x.c", &root), None);
/// assert_eq!(resolve("a['b']['c']", &root), Some(Value::from(5)));
/// ```
pub fn resolve(path: &str, root: &Value) -> Option<Value> {
    let normalized = normalize_path(path);
    let mut current = root.clone();

    for segment in normalized.split('.') {
        if !current.is_truthy() {
            return None;
        }
        current = current.property(segment)?;
    }

    Some(current)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Object;
    use serde_json::json;

    #[test]
    fn nested_dot_path() {
        let root = Value::from(json!({"a": {"b": {"c": 5}}}));
        assert_eq!(resolve("a.b.c", &root), Some(Value::from(5)));
    }

    #[test]
    fn missing_leaf_is_not_found() {
        let root = Value::from(json!({"a": {"b": {}}}));
        assert_eq!(resolve("a.b.c", &root), None);
    }

    #[test]
    fn bracket_quote_form() {
        let root = Value::from(json!({"a": {"b": 7}}));
        assert_eq!(resolve("a['b']", &root), Some(Value::from(7)));
    }

    #[test]
    fn falsy_intermediate_short_circuits() {
        let root = Value::from(json!({"a": 0, "b": "", "c": null, "d": false}));

        assert_eq!(resolve("a.x", &root), None);
        assert_eq!(resolve("b.length", &root), None);
        assert_eq!(resolve("c.x", &root), None);
        assert_eq!(resolve("d.x", &root), None);

        // Falsy leaves are still found
        assert_eq!(resolve("a", &root), Some(Value::from(0)));
        assert_eq!(resolve("c", &root), Some(Value::Null));
    }

    #[test]
    fn primitive_intermediate_has_no_properties() {
        let root = Value::from(json!({"name": "Ada", "n": 3}));
        assert_eq!(resolve("name.length", &root), None);
        assert_eq!(resolve("n.x", &root), None);
    }

    #[test]
    fn array_indices_and_length() {
        let root = Value::from(json!({"items": ["x", "y"]}));
        assert_eq!(resolve("items.1", &root), Some(Value::from("y")));
        assert_eq!(resolve("items.length", &root), Some(Value::from(2)));
        assert_eq!(resolve("items[1]", &root), None);
    }

    #[test]
    fn inherited_properties_resolve() {
        let proto = Object::new();
        proto.insert("kind", "component");
        let root = Object::with_prototype(proto);
        assert_eq!(
            resolve("kind", &Value::from(root)),
            Some(Value::from("component"))
        );
    }

    #[test]
    fn falsy_root_resolves_nothing() {
        assert_eq!(resolve("a", &Value::Null), None);
        assert_eq!(resolve("", &Value::Bool(false)), None);
    }

    #[test]
    fn odd_paths_do_not_panic() {
        let root = Value::from(json!({"": {"": 1}, "a": {"b": 2}}));

        // The empty path is the empty key
        assert_eq!(
            resolve("", &root).map(|v| v.to_text()),
            Some("[object Object]".to_string())
        );
        assert_eq!(resolve(".", &root), Some(Value::from(1)));
        assert_eq!(resolve("a..b", &root), None);
        // A leading bracket becomes a leading empty segment
        assert_eq!(resolve("['a']['b']", &root), None);
        assert_eq!(resolve("a['b", &root), Some(Value::from(2)));
        assert_eq!(resolve("a.b']", &root), Some(Value::from(2)));
    }

    #[test]
    fn resolution_is_not_cached() {
        let data = Object::new();
        let root = Value::from(data.clone());

        assert_eq!(resolve("count", &root), None);
        data.insert("count", 1);
        assert_eq!(resolve("count", &root), Some(Value::from(1)));
    }
}
