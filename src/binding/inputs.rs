// ============================================================================
// spark-elements - Input Aggregator
// Turns `data-<key>="<path>"` host attributes into data bag entries
// ============================================================================

use tracing::trace;

use crate::core::types::ResolveBinding;
use crate::core::value::Object;

/// Resolve every prefixed host attribute into `bag`.
///
/// For each attribute whose name starts with `prefix`, the key is the name
/// with the prefix stripped and the attribute value is the path handed to
/// `source`. Only truthy results are stored. A falsy or unresolved input
/// leaves whatever the bag already holds under that key.
///
/// Returns the number of stored inputs.
///
/// # Example
/// ```
/// use spark_elements::{resolve_inputs, Object, Value};
/// use serde_json::json;
///
/// let global = Value::from(json!({ "x": { "y": "hi" } }));
/// let bag = Object::new();
/// let attributes = vec![
///     ("data-foo".to_string(), "x.y".to_string()),
///     ("data-bar".to_string(), "x.missing".to_string()),
///     ("class".to_string(), "x.y".to_string()),
/// ];
///
/// assert_eq!(resolve_inputs(&attributes, "data-", &global, &bag), 1);
/// assert_eq!(bag.get("foo"), Some(Value::from("hi")));
/// assert!(!bag.has("bar"));
/// ```
pub fn resolve_inputs(
    attributes: &[(String, String)],
    prefix: &str,
    source: &dyn ResolveBinding,
    bag: &Object,
) -> usize {
    let mut stored = 0;

    for (name, path) in attributes {
        let Some(key) = name.strip_prefix(prefix) else {
            continue;
        };

        match source.binding_value(path) {
            Some(value) if value.is_truthy() => {
                trace!(key, path = path.as_str(), "input resolved");
                bag.insert(key, value);
                stored += 1;
            }
            _ => trace!(key, path = path.as_str(), "input unresolved"),
        }
    }

    stored
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Unbound;
    use crate::core::value::Value;
    use serde_json::json;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn stores_truthy_results_only() {
        let global = Value::from(json!({ "user": { "name": "Ada", "age": 0 } }));
        let bag = Object::new();

        let stored = resolve_inputs(
            &attrs(&[("data-name", "user.name"), ("data-age", "user.age")]),
            "data-",
            &global,
            &bag,
        );

        assert_eq!(stored, 1);
        assert_eq!(bag.get("name"), Some(Value::from("Ada")));
        assert!(!bag.has("age"));
    }

    #[test]
    fn unresolved_input_keeps_prior_value() {
        let bag = Object::new();
        bag.insert("foo", "old");

        resolve_inputs(&attrs(&[("data-foo", "nope")]), "data-", &Unbound, &bag);

        assert_eq!(bag.get("foo"), Some(Value::from("old")));
    }

    #[test]
    fn key_keeps_everything_after_the_prefix() {
        let global = Value::from(json!({ "v": 1 }));
        let bag = Object::new();

        resolve_inputs(
            &attrs(&[("data-user-id", "v"), ("data-", "v")]),
            "data-",
            &global,
            &bag,
        );

        assert!(bag.has("user-id"));
        assert!(bag.has(""));
    }

    #[test]
    fn objects_are_stored_by_reference() {
        let shared = Object::new();
        shared.insert("count", 1);
        let global = Object::new();
        global.insert("state", shared.clone());
        let bag = Object::new();

        resolve_inputs(&attrs(&[("data-state", "state")]), "data-", &global, &bag);
        shared.insert("count", 2);

        let state = bag.get("state").unwrap();
        assert!(state.as_object().unwrap().ptr_eq(&shared));
        assert_eq!(state.property("count"), Some(Value::from(2)));
    }

    #[test]
    fn custom_prefix() {
        let global = Value::from(json!({ "a": "x" }));
        let bag = Object::new();

        let stored = resolve_inputs(
            &attrs(&[("in-a", "a"), ("data-a", "a")]),
            "in-",
            &global,
            &bag,
        );

        assert_eq!(stored, 1);
        assert_eq!(bag.keys(), vec!["a".to_string()]);
    }
}
