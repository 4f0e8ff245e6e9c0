// ============================================================================
// spark-elements - Binding Source Discovery
// Which component (or global root) a host's inputs resolve through
// ============================================================================

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::core::config::FallbackRoot;
use crate::core::types::ResolveBinding;
use crate::core::value::Value;
use crate::dom::node::Node;

/// Where a host resolves its inputs.
#[derive(Clone)]
pub enum BindingSource {
    /// The component whose shadow tree contains the host
    Component(Rc<dyn ResolveBinding>),
    /// A global root, the default view of a document
    Global(Value),
    /// Nothing; every input stays unset
    Unbound,
}

impl BindingSource {
    pub fn is_component(&self) -> bool {
        matches!(self, BindingSource::Component(_))
    }

    pub fn is_global(&self) -> bool {
        matches!(self, BindingSource::Global(_))
    }

    pub fn is_unbound(&self) -> bool {
        matches!(self, BindingSource::Unbound)
    }
}

impl ResolveBinding for BindingSource {
    fn binding_value(&self, path: &str) -> Option<Value> {
        match self {
            BindingSource::Component(component) => component.binding_value(path),
            BindingSource::Global(root) => root.binding_value(path),
            BindingSource::Unbound => None,
        }
    }
}

impl fmt::Debug for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingSource::Component(_) => f.write_str("Component"),
            BindingSource::Global(root) => f.debug_tuple("Global").field(root).finish(),
            BindingSource::Unbound => f.write_str("Unbound"),
        }
    }
}

/// Walk up from `host` to the first fragment or the top of its tree.
///
/// - A shadow root whose host carries a live component gives that
///   component.
/// - A document gives its default view, if it has one.
/// - Anything else (detached subtree, fragment without a component) is
///   decided by `fallback`.
pub fn find_binding_source(host: &Node, fallback: FallbackRoot) -> BindingSource {
    let mut top = host.clone();
    while !top.is_fragment() {
        match top.parent() {
            Some(parent) => top = parent,
            None => break,
        }
    }

    if top.is_fragment() {
        if let Some(component) = top.host().and_then(|h| h.binding_capability()) {
            trace!("inputs resolve through ancestor component");
            return BindingSource::Component(component);
        }
    }

    if top.is_document() {
        return match top.default_view() {
            Some(view) => BindingSource::Global(view),
            None => BindingSource::Unbound,
        };
    }

    match fallback {
        FallbackRoot::OwnerDocument => host
            .owner_document()
            .and_then(|doc| doc.default_view())
            .map(BindingSource::Global)
            .unwrap_or(BindingSource::Unbound),
        FallbackRoot::None => BindingSource::Unbound,
    }
}

// =============================================================================
// TESTS
// =============================================================================
