// ============================================================================
// spark-elements - Errors
// Failures reported by configuration loading and the lifecycle
// ============================================================================

use thiserror::Error;

/// Failures inside the component machinery.
///
/// The lifecycle never returns these to callers; they are reported as
/// `tracing` events and the step is skipped. Only configuration loading
/// hands them out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElementError {
    #[error("no template with id `{id}` in the owner document")]
    MissingTemplate { id: String },
    #[error("host node cannot carry a shadow root")]
    MissingShadowRoot,
    #[error("watch registration for `{path}` failed: registry is busy")]
    WatchRegistration { path: String },
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ElementError>;

impl From<serde_json::Error> for ElementError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
