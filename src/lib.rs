// ============================================================================
// spark-elements - Template-Backed Components for Rust
// ============================================================================
//
// A component renders a template into its shadow root, binds markup to
// data resolved by path, and polls watched paths for changes.
//
// Layers, leaf first:
// - core:       values, the resolver capability, config, errors
// - binding:    path resolution, input aggregation, markup bindings
// - dom:        the markup capability and an in-memory node tree
// - reactivity: watch registry, equality, scheduler and poll loop
// - element:    the component and its lifecycle
// ============================================================================

#[macro_use]
mod macros;

pub mod binding;
pub mod core;
pub mod dom;
pub mod element;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use crate::core::constants;
pub use crate::core::{ElementConfig, ElementError, FallbackRoot, ResolveBinding, Result, Unbound};
pub use crate::core::{Array, Object, Value};

// Re-export binding functions
pub use binding::{
    apply_bindings, bracket_target, normalize_path, resolve, resolve_inputs,
    scan_attribute_bindings, scan_text_bindings, AppliedBindings, BindingDeclaration, BindingKind,
};

// Re-export the markup layer
pub use dom::{MarkupNode, Node, NodeKind};

// Re-export reactivity types
pub use reactivity::equality::{
    deep_equals, nan_unequal_equals, never_equals, strict_equals, WatchEqualsFn,
};
pub use reactivity::scheduling::{ManualScheduler, PollLoop, Scheduler, Task, TaskId};
pub use reactivity::watchers::{Destroyer, WatchFn, WatcherRegistry};

// Re-export the component
pub use element::{find_binding_source, BindingSource, Element, Lifecycle};

// =============================================================================
// TESTS
// =============================================================================
