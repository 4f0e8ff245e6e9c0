// ============================================================================
// spark-elements - Element Module
// The component, its lifecycle and binding source discovery
// ============================================================================

pub mod ancestry;
pub mod component;
pub mod lifecycle;

pub use ancestry::{find_binding_source, BindingSource};
pub use component::Element;
pub use lifecycle::Lifecycle;
