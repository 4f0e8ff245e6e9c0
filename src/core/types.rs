// ============================================================================
// spark-elements - Core Types
// The resolver capability shared by components and global roots
// ============================================================================

use std::rc::Rc;

use crate::binding::path::resolve;
use crate::core::value::{Object, Value};

// =============================================================================
// RESOLVER CAPABILITY
// =============================================================================

/// Anything that can turn a binding path into a value.
///
/// Components implement this so nested components can resolve their inputs
/// through the nearest ancestor component instead of the global root.
/// Implementations must not panic; `None` means "not found".
pub trait ResolveBinding {
    fn binding_value(&self, path: &str) -> Option<Value>;
}

impl ResolveBinding for Value {
    fn binding_value(&self, path: &str) -> Option<Value> {
        resolve(path, self)
    }
}

impl ResolveBinding for Object {
    fn binding_value(&self, path: &str) -> Option<Value> {
        resolve(path, &Value::Object(self.clone()))
    }
}

impl<T: ResolveBinding + ?Sized> ResolveBinding for Rc<T> {
    fn binding_value(&self, path: &str) -> Option<Value> {
        (**self).binding_value(path)
    }
}

/// A resolver that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unbound;

impl ResolveBinding for Unbound {
    fn binding_value(&self, _path: &str) -> Option<Value> {
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_and_object_roots_resolve_paths() {
        let root = Value::from(json!({"app": {"title": "Inbox"}}));
        assert_eq!(root.binding_value("app.title"), Some(Value::from("Inbox")));

        let obj = root.as_object().cloned().unwrap();
        assert_eq!(obj.binding_value("app['title']"), Some(Value::from("Inbox")));
    }

    #[test]
    fn trait_objects_resolve_through_rc() {
        let root: Rc<dyn ResolveBinding> = Rc::new(Value::from(json!({"n": 1})));
        assert_eq!(root.binding_value("n"), Some(Value::from(1)));
        assert_eq!(Unbound.binding_value("n"), None);
    }
}
