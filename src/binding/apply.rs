// ============================================================================
// spark-elements - Binding Applier
// One-shot scan of rendered markup: `bind` text and `[attr]` attributes
// ============================================================================
//
// Two passes, in order:
// 1. Elements carrying the bind attribute get their text replaced by the
//    resolved value, when truthy.
// 2. Every `[name]="<path>"` attribute sets attribute `name` to the resolved
//    value, or to "" when nothing truthy resolves. The bracket attribute is
//    kept, so the pass can be re-run against the same markup.
//
// Declarations are rediscovered on every run; nothing is stored.
// ============================================================================

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use crate::core::types::ResolveBinding;
use crate::dom::markup::MarkupNode;

lazy_static! {
    /// `[identifier]` where identifier is lowercase letters and dashes.
    static ref BRACKET_ATTRIBUTE: Regex = Regex::new(r"^\[([a-z][a-z\-]*)\]$")
        .expect("bracket attribute pattern is valid");
}

/// The target attribute named by a bracket attribute, if `name` is one.
///
/// ```
/// use spark_elements::bracket_target;
///
/// assert_eq!(bracket_target("[title]"), Some("title"));
/// assert_eq!(bracket_target("[aria-label]"), Some("aria-label"));
/// assert_eq!(bracket_target("[Title]"), None);
/// assert_eq!(bracket_target("[]"), None);
/// assert_eq!(bracket_target("x[title]"), None);
/// ```
pub fn bracket_target(name: &str) -> Option<&str> {
    BRACKET_ATTRIBUTE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// =============================================================================
// DECLARATIONS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Replace the element's text content
    Text,
    /// Set the named attribute
    Attribute { name: String },
}

/// A link between one element and a source path, found by scanning markup.
#[derive(Clone, Debug)]
pub struct BindingDeclaration<N> {
    pub element: N,
    pub path: String,
    pub kind: BindingKind,
}

/// Every element under `root` carrying `bind_attribute`, in document order.
pub fn scan_text_bindings<N: MarkupNode>(root: &N, bind_attribute: &str) -> Vec<BindingDeclaration<N>> {
    root.select_all(&mut |el| el.has_attribute(bind_attribute))
        .into_iter()
        .filter_map(|element| {
            let path = element.attribute(bind_attribute)?;
            Some(BindingDeclaration {
                element,
                path,
                kind: BindingKind::Text,
            })
        })
        .collect()
}

/// Every bracket attribute under `root`, in document then attribute order.
pub fn scan_attribute_bindings<N: MarkupNode>(root: &N) -> Vec<BindingDeclaration<N>> {
    let mut declarations = Vec::new();

    for element in root.select_all(&mut |_| true) {
        for (name, path) in element.attributes() {
            if let Some(target) = bracket_target(&name) {
                declarations.push(BindingDeclaration {
                    element: element.clone(),
                    path,
                    kind: BindingKind::Attribute {
                        name: target.to_string(),
                    },
                });
            }
        }
    }

    declarations
}

// =============================================================================
// APPLY
// =============================================================================

/// How many bindings a pass wrote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AppliedBindings {
    /// Text bindings whose element text was replaced
    pub text: usize,
    /// Attribute bindings written (including those cleared to "")
    pub attributes: usize,
}

/// Apply text then attribute bindings under `root`, resolving through
/// `source`.
pub fn apply_bindings<N: MarkupNode>(
    root: &N,
    source: &dyn ResolveBinding,
    bind_attribute: &str,
) -> AppliedBindings {
    let mut applied = AppliedBindings::default();

    for binding in scan_text_bindings(root, bind_attribute) {
        match source.binding_value(&binding.path) {
            Some(value) if value.is_truthy() => {
                trace!(path = binding.path.as_str(), "text binding applied");
                binding.element.set_text(&value.to_text());
                applied.text += 1;
            }
            _ => trace!(path = binding.path.as_str(), "text binding unresolved"),
        }
    }

    // Scanned after the text pass so it sees the markup as pass 1 left it
    for binding in scan_attribute_bindings(root) {
        let BindingKind::Attribute { name } = &binding.kind else {
            continue;
        };
        let text = match source.binding_value(&binding.path) {
            Some(value) if value.is_truthy() => value.to_text(),
            _ => String::new(),
        };
        trace!(attribute = name.as_str(), path = binding.path.as_str(), "attribute binding applied");
        binding.element.set_attribute(name, &text);
        applied.attributes += 1;
    }

    applied
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::dom::node::Node;
    use serde_json::json;

    fn fragment_with(children: &[Node]) -> Node {
        let root = Node::fragment();
        for child in children {
            root.append_child(child);
        }
        root
    }

    #[test]
    fn bracket_pattern_is_anchored() {
        assert_eq!(bracket_target("[href]"), Some("href"));
        assert_eq!(bracket_target("[data-x]"), Some("data-x"));
        assert_eq!(bracket_target("[-x]"), None);
        assert_eq!(bracket_target("[x1]"), None);
        assert_eq!(bracket_target("[title]x"), None);
        assert_eq!(bracket_target("title"), None);
    }

    #[test]
    fn text_binding_writes_truthy_values() {
        let name = Node::element("span").with_attribute("bind", "user.name");
        name.set_text_content("placeholder");
        let age = Node::element("span").with_attribute("bind", "user.age");
        age.set_text_content("placeholder");
        let root = fragment_with(&[name.clone(), age.clone()]);

        let source = Value::from(json!({ "user": { "name": "Ada", "age": 0 } }));
        let applied = apply_bindings(&root, &source, "bind");

        assert_eq!(applied.text, 1);
        assert_eq!(name.text_content(), "Ada");
        assert_eq!(age.text_content(), "placeholder");
    }

    #[test]
    fn numbers_and_arrays_are_coerced() {
        let count = Node::element("b").with_attribute("bind", "count");
        let tags = Node::element("i").with_attribute("bind", "tags");
        let root = fragment_with(&[count.clone(), tags.clone()]);

        let source = Value::from(json!({ "count": 3, "tags": ["a", "b"] }));
        apply_bindings(&root, &source, "bind");

        assert_eq!(count.text_content(), "3");
        assert_eq!(tags.text_content(), "a,b");
    }

    #[test]
    fn attribute_binding_sets_or_clears() {
        let link = Node::element("a")
            .with_attribute("[title]", "name")
            .with_attribute("[href]", "missing");
        let root = fragment_with(&[link.clone()]);

        let source = Value::from(json!({ "name": "Bob" }));
        let applied = apply_bindings(&root, &source, "bind");

        assert_eq!(applied.attributes, 2);
        assert_eq!(link.attribute("title").as_deref(), Some("Bob"));
        assert_eq!(link.attribute("href").as_deref(), Some(""));
        assert_eq!(link.attribute("[title]").as_deref(), Some("name"));
    }

    #[test]
    fn malformed_bracket_names_are_ignored() {
        let el = Node::element("div")
            .with_attribute("[Title]", "name")
            .with_attribute("[]", "name");
        let root = fragment_with(&[el.clone()]);

        let applied = apply_bindings(&root, &Value::from(json!({ "name": "x" })), "bind");

        assert_eq!(applied.attributes, 0);
        assert_eq!(el.attributes().len(), 2);
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let span = Node::element("span").with_attribute("bind", "n");
        let a = Node::element("a").with_attribute("[title]", "n");
        let root = fragment_with(&[span, a]);
        let source = Value::from(json!({ "n": "x" }));

        apply_bindings(&root, &source, "bind");
        let once = root.to_markup();
        apply_bindings(&root, &source, "bind");

        assert_eq!(root.to_markup(), once);
    }

    #[test]
    fn root_itself_is_not_scanned() {
        let root = Node::element("div").with_attribute("bind", "n");
        root.set_text_content("keep");

        let applied = apply_bindings(&root, &Value::from(json!({ "n": "x" })), "bind");

        assert_eq!(applied, AppliedBindings::default());
        assert_eq!(root.text_content(), "keep");
    }

    #[test]
    fn text_pass_replaces_nested_bindings() {
        let outer = Node::element("div").with_attribute("bind", "outer");
        let inner = Node::element("a").with_attribute("[title]", "t");
        outer.append_child(&inner);
        let root = fragment_with(&[outer.clone()]);

        let applied = apply_bindings(&root, &Value::from(json!({ "outer": "hi", "t": "x" })), "bind");

        assert_eq!(applied.attributes, 0);
        assert_eq!(root.to_markup(), "<div bind=\"outer\">hi</div>");
    }
}
