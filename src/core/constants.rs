// ============================================================================
// spark-elements - Constants
// Markup names and timing defaults shared by the binding engine
// ============================================================================

// =============================================================================
// MARKUP CONTRACT
// =============================================================================

/// Host attribute prefix declaring an input, e.g. `data-user="app.user"`
pub const DATA_PREFIX: &str = "data-";

/// Attribute declaring a text binding, e.g. `<span bind="data.name">`
pub const BIND_ATTRIBUTE: &str = "bind";

/// Property of the component root holding the data bag
pub const DATA_PROPERTY: &str = "data";

/// Tag name of template elements looked up by component tag
pub const TEMPLATE_TAG: &str = "template";

// =============================================================================
// POLLING
// =============================================================================

/// Delay between two watcher ticks, in milliseconds
pub const POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_names_are_lowercase() {
        for name in [DATA_PREFIX, BIND_ATTRIBUTE, DATA_PROPERTY, TEMPLATE_TAG] {
            assert_eq!(name, name.to_ascii_lowercase());
        }
    }

    #[test]
    fn poll_interval_is_quarter_second() {
        assert_eq!(POLL_INTERVAL_MS, 250);
    }
}
