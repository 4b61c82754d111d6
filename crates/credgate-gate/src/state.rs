use std::fmt;

use crate::error::GateError;

/// Stages of the gate, from construction to a per-request decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GateState {
    /// Configuration not yet validated.
    Unconfigured,
    /// Configuration validated and resolver built; ready for requests.
    Configured,
    /// Resolving the submitter's DID and signing key.
    Resolving,
    /// Verifying the presentation and matching it against the definition.
    Verifying,
    /// Running custom handlers over the verified submission data.
    ApplyingHandlers,
    /// A result has been produced. Final state.
    Decided,
}

impl GateState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Decided)
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "Unconfigured"),
            Self::Configured => write!(f, "Configured"),
            Self::Resolving => write!(f, "Resolving"),
            Self::Verifying => write!(f, "Verifying"),
            Self::ApplyingHandlers => write!(f, "ApplyingHandlers"),
            Self::Decided => write!(f, "Decided"),
        }
    }
}

/// Events that drive the gate between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// Configuration validated and resolver constructed.
    Configure,
    /// A submission passed parsing; start resolving its signer.
    Resolve,
    /// Signer key obtained; start verifying the submission.
    Verify,
    /// Submission verified; start running custom handlers.
    ApplyHandlers,
    /// A decision (accept or deny) has been made.
    Decide,
}

/// Validates gate state transitions.
///
/// Valid transitions:
/// - Unconfigured → Configured (Configure)
/// - Configured → Resolving (Resolve)
/// - Resolving → Verifying (Verify)
/// - Verifying → ApplyingHandlers (ApplyHandlers)
/// - Configured | Resolving | Verifying | ApplyingHandlers → Decided (Decide)
pub struct GateStateMachine;

impl GateStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(current: GateState, event: GateEvent) -> Result<GateState, GateError> {
        let new_state = match (current, event) {
            (GateState::Unconfigured, GateEvent::Configure) => GateState::Configured,
            (GateState::Configured, GateEvent::Resolve) => GateState::Resolving,
            (GateState::Resolving, GateEvent::Verify) => GateState::Verifying,
            (GateState::Verifying, GateEvent::ApplyHandlers) => GateState::ApplyingHandlers,
            (
                GateState::Configured
                | GateState::Resolving
                | GateState::Verifying
                | GateState::ApplyingHandlers,
                GateEvent::Decide,
            ) => GateState::Decided,
            _ => {
                let target = match event {
                    GateEvent::Configure => GateState::Configured,
                    GateEvent::Resolve => GateState::Resolving,
                    GateEvent::Verify => GateState::Verifying,
                    GateEvent::ApplyHandlers => GateState::ApplyingHandlers,
                    GateEvent::Decide => GateState::Decided,
                };
                return Err(GateError::InvalidStateTransition {
                    from: current,
                    to: target,
                });
            }
        };

        tracing::trace!(
            from = %current,
            to = %new_state,
            event = ?event,
            "gate state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: GateState, event: GateEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
