use serde_json::json;
use spark_elements::{
    apply_bindings, scan_attribute_bindings, scan_text_bindings, BindingKind, Element,
    ManualScheduler, Node, Object, Value,
};
use std::rc::Rc;

fn card() -> Node {
    let root = Node::fragment();
    let article = Node::element("article").with_attribute("[data-id]", "id");
    let title = Node::element("h1").with_attribute("bind", "title");
    title.set_text_content("Untitled");
    let link = Node::element("a")
        .with_attribute("[href]", "links['home']")
        .with_attribute("[title]", "title");
    let empty = Node::element("p").with_attribute("bind", "summary");
    empty.set_text_content("No summary");

    article.append_child(&title);
    article.append_child(&link);
    article.append_child(&empty);
    root.append_child(&article);
    root
}

#[test]
fn scans_declarations_in_document_order() {
    let root = card();

    let text: Vec<String> = scan_text_bindings(&root, "bind")
        .into_iter()
        .map(|b| b.path)
        .collect();
    assert_eq!(text, vec!["title", "summary"]);

    let attributes: Vec<(String, String)> = scan_attribute_bindings(&root)
        .into_iter()
        .map(|b| match b.kind {
            BindingKind::Attribute { name } => (name, b.path),
            BindingKind::Text => unreachable!(),
        })
        .collect();
    assert_eq!(
        attributes,
        vec![
            ("data-id".to_string(), "id".to_string()),
            ("href".to_string(), "links['home']".to_string()),
            ("title".to_string(), "title".to_string()),
        ]
    );
}

#[test]
fn full_pass_over_a_card() {
    let root = card();
    let source = Value::from(json!({
        "id": 7,
        "title": "Hello",
        "links": { "home": "/" },
        "summary": ""
    }));

    let applied = apply_bindings(&root, &source, "bind");

    assert_eq!(applied.text, 1);
    assert_eq!(applied.attributes, 3);
    assert_eq!(
        root.to_markup(),
        "<article [data-id]=\"id\" data-id=\"7\">\
         <h1 bind=\"title\">Hello</h1>\
         <a [href]=\"links['home']\" [title]=\"title\" href=\"/\" title=\"Hello\"></a>\
         <p bind=\"summary\">No summary</p>\
         </article>"
    );
}

#[test]
fn second_pass_with_same_data_changes_nothing() {
    let root = card();
    let source = Value::from(json!({ "title": "Same" }));

    apply_bindings(&root, &source, "bind");
    let once = root.to_markup();
    apply_bindings(&root, &source, "bind");

    assert_eq!(root.to_markup(), once);
}

#[test]
fn unresolved_attribute_becomes_empty() {
    let root = Node::fragment();
    let link = Node::element("a").with_attribute("[title]", "name");
    root.append_child(&link);

    apply_bindings(&root, &Value::from(json!({ "name": "Bob" })), "bind");
    assert_eq!(link.attribute("title").as_deref(), Some("Bob"));

    apply_bindings(&root, &Value::from(json!({})), "bind");
    assert_eq!(link.attribute("title").as_deref(), Some(""));
}

#[test]
fn text_from_an_object_reference() {
    let shared = Object::new();
    shared.insert("n", 1);
    let source = Object::new();
    source.insert("shared", shared.clone());

    let root = Node::fragment();
    let out = Node::element("b").with_attribute("bind", "shared.n");
    root.append_child(&out);

    apply_bindings(&root, &source, "bind");
    assert_eq!(out.text_content(), "1");

    shared.insert("n", 2);
    apply_bindings(&root, &source, "bind");
    assert_eq!(out.text_content(), "2");
}

#[test]
fn element_updates_a_custom_root() {
    let el = Element::new(Node::element("x-host"), Rc::new(ManualScheduler::new()));
    el.data().insert("label", "ok");

    let root = Node::fragment();
    let target = Node::element("span").with_attribute("bind", "data.label");
    root.append_child(&target);

    let applied = el.update_bindings(Some(&root));
    assert_eq!(applied.text, 1);
    assert_eq!(target.text_content(), "ok");
}
