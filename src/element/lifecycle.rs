// ============================================================================
// spark-elements - Component Lifecycle
// ============================================================================

/// Where a component is in its life.
///
/// ```text
/// Constructed --activate--> Active <--activate/deactivate--> Inactive
/// ```
///
/// The first activation renders; later ones only resume polling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Created, nothing rendered, not polling
    #[default]
    Constructed,
    /// Rendered and polling
    Active,
    /// Detached: watches cleared, not polling
    Inactive,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }

    /// Whether moving to `next` is a real transition.
    pub fn can_transition_to(self, next: Lifecycle) -> bool {
        matches!(
            (self, next),
            (Lifecycle::Constructed, Lifecycle::Active)
                | (Lifecycle::Active, Lifecycle::Inactive)
                | (Lifecycle::Inactive, Lifecycle::Active)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        use Lifecycle::*;
        assert!(Constructed.can_transition_to(Active));
        assert!(Active.can_transition_to(Inactive));
        assert!(Inactive.can_transition_to(Active));

        assert!(!Constructed.can_transition_to(Inactive));
        assert!(!Active.can_transition_to(Active));
        assert!(!Inactive.can_transition_to(Constructed));
    }
}
