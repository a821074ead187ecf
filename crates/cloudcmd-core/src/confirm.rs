//! Confirmation gating for destructive operations.
//!
//! An operation's descriptor declares its impact; the adapter consults the
//! gate for `Medium` and above before the request is constructed. The shell
//! installs an interactive gate, `--force` installs [`AlwaysProceed`].

/// How destructive an operation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfirmImpact {
    None,
    Low,
    Medium,
    High,
}

/// Decides whether a gated operation may proceed.
pub trait ConfirmGate: Send + Sync {
    /// `action` is the remote operation name, `target` a short description
    /// of the resource it would act on.
    fn should_proceed(&self, impact: ConfirmImpact, action: &str, target: &str) -> bool;
}

/// Gate that approves everything (the `--force` path).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysProceed;

impl ConfirmGate for AlwaysProceed {
    fn should_proceed(&self, _impact: ConfirmImpact, _action: &str, _target: &str) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_ordering() {
        assert!(ConfirmImpact::High > ConfirmImpact::Medium);
        assert!(ConfirmImpact::Medium > ConfirmImpact::Low);
        assert!(ConfirmImpact::None < ConfirmImpact::Low);
    }

    #[test]
    fn always_proceed_approves() {
        assert!(AlwaysProceed.should_proceed(ConfirmImpact::High, "DeleteThing", "thing-1"));
    }
}
