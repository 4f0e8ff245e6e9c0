// ============================================================================
// spark-elements - Binding Module
// Path resolution, input aggregation and markup binding
// ============================================================================

pub mod apply;
pub mod inputs;
pub mod path;

pub use apply::{
    apply_bindings, bracket_target, scan_attribute_bindings, scan_text_bindings, AppliedBindings,
    BindingDeclaration, BindingKind,
};
pub use inputs::resolve_inputs;
pub use path::{normalize_path, resolve};
