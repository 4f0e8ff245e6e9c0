use proptest::prelude::*;
use serde_json::Value as Json;
use spark_elements::{normalize_path, resolve, resolve_inputs, Object, Value};

fn json_value() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::from),
        any::<i32>().prop_map(Json::from),
        "[a-z]{0,4}".prop_map(Json::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Json::Array),
            prop::collection::btree_map("[a-z.'\\[\\]]{0,3}", inner, 0..4)
                .prop_map(|m| Json::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn resolve_never_panics(path in "[a-z0-9.'\\[\\] ]{0,24}", root in json_value()) {
        let root = Value::from(root);
        let _ = resolve(&path, &root);
    }

    #[test]
    fn bracket_and_dot_forms_agree(keys in prop::collection::vec("[a-z]{1,6}", 1..5), leaf in any::<i32>()) {
        let mut nested = Json::from(leaf);
        for key in keys.iter().rev() {
            nested = Json::Object([(key.clone(), nested)].into_iter().collect());
        }
        let root = Value::from(nested);

        let dotted = keys.join(".");
        let bracketed = format!(
            "{}{}",
            keys[0],
            keys[1..].iter().map(|k| format!("['{k}']")).collect::<String>()
        );

        prop_assert_eq!(normalize_path(&bracketed), dotted.clone());
        prop_assert_eq!(resolve(&dotted, &root), Some(Value::from(leaf)));
        prop_assert_eq!(resolve(&bracketed, &root), Some(Value::from(leaf)));
    }

    #[test]
    fn inputs_store_only_truthy_strings(text in "[a-z]{0,3}") {
        let global = Object::new();
        global.insert("v", text.as_str());
        let bag = Object::new();
        let attributes = vec![("data-v".to_string(), "v".to_string())];

        let stored = resolve_inputs(&attributes, "data-", &global, &bag);

        prop_assert_eq!(stored == 1, !text.is_empty());
        prop_assert_eq!(bag.has("v"), !text.is_empty());
    }
}
