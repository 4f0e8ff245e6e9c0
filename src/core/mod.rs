// ============================================================================
// spark-elements - Core Module
// Values, the resolver capability, configuration and errors
// ============================================================================

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod value;

// Re-export commonly used items
pub use config::{ElementConfig, FallbackRoot};
pub use constants::*;
pub use error::{ElementError, Result};
pub use types::{ResolveBinding, Unbound};
pub use value::{Array, Object, Value};
