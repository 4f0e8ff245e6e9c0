// ============================================================================
// spark-elements - Markup Capability
// The slice of a DOM the binding applier depends on
// ============================================================================

/// A node in a markup tree that bindings can be applied to.
///
/// This is the whole contract between the binding engine and a DOM: find
/// elements under a root, read their attributes, write text or attributes.
/// Handles are cheap clones referring to the same node.
pub trait MarkupNode: Clone {
    /// Descendant elements of `self` (not `self`) in document order for which
    /// `predicate` returns true.
    fn select_all(&self, predicate: &mut dyn FnMut(&Self) -> bool) -> Vec<Self>;

    /// Snapshot of the element's attributes in order.
    fn attributes(&self) -> Vec<(String, String)>;

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes()
            .into_iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn set_attribute(&self, name: &str, value: &str);

    /// Replace the element's children with a single text node.
    fn set_text(&self, text: &str);
}
