// ============================================================================
// spark-elements - Element Configuration
// Poll timing, markup names and the global fallback policy
// ============================================================================

use std::time::Duration;

use serde::Deserialize;

use crate::core::constants::{BIND_ATTRIBUTE, DATA_PREFIX, POLL_INTERVAL_MS};
use crate::core::error::{ElementError, Result};

// =============================================================================
// FALLBACK ROOT
// =============================================================================

/// Where inputs resolve when no ancestor component and no document is found
/// on the way up from the host (detached hosts, shadow roots of plain hosts).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackRoot {
    /// Resolve against the default view of the host's owner document.
    #[default]
    OwnerDocument,
    /// Resolve nothing; inputs stay unset.
    None,
}

// =============================================================================
// ELEMENT CONFIG
// =============================================================================

/// Per-component settings.
///
/// # Example
///
/// ```
/// use spark_elements::{ElementConfig, FallbackRoot};
///
/// let config = ElementConfig::from_json(r#"{ "poll-interval-ms": 100, "fallback": "none" }"#)
///     .unwrap();
/// assert_eq!(config.poll_interval().as_millis(), 100);
/// assert_eq!(config.fallback, FallbackRoot::None);
/// assert_eq!(config.data_prefix, "data-");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ElementConfig {
    /// Delay between watcher ticks
    pub poll_interval_ms: u64,
    /// Host attribute prefix that declares inputs
    pub data_prefix: String,
    /// Attribute that declares text bindings
    pub bind_attribute: String,
    pub fallback: FallbackRoot,
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: POLL_INTERVAL_MS,
            data_prefix: DATA_PREFIX.to_string(),
            bind_attribute: BIND_ATTRIBUTE.to_string(),
            fallback: FallbackRoot::default(),
        }
    }
}

impl ElementConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: ElementConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Sub-millisecond remainders round up; intervals beyond `u64::MAX`
    /// milliseconds saturate.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        let millis = interval.as_nanos().div_ceil(1_000_000);
        self.poll_interval_ms = u64::try_from(millis).unwrap_or(u64::MAX);
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackRoot) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_data_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.data_prefix = prefix.into();
        self
    }

    /// A zero interval would reschedule ticks forever without advancing time.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(ElementError::Config(
                "poll-interval-ms must be greater than zero".to_string(),
            ));
        }
        if self.data_prefix.is_empty() {
            return Err(ElementError::Config("data-prefix must not be empty".to_string()));
        }
        if self.bind_attribute.is_empty() {
            return Err(ElementError::Config(
                "bind-attribute must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
