//! Invitation state machine
//!
//! An invitation starts pending and moves to exactly one terminal state:
//! accepted (becomes a membership), rejected, or revoked. Transitions are
//! one-way; no invitation is reused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

/// Invitation states. Derived from the terminal timestamps on the
/// invitation row, not stored directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Rejected,
    Revoked,
}

impl InvitationState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected | Self::Revoked)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [InvitationState] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Rejected, Self::Revoked],
            Self::Accepted => &[],
            Self::Rejected => &[],
            Self::Revoked => &[],
        }
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// Events that trigger invitation state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvitationEvent {
    /// The invitation is accepted and converts into a membership
    Accept,
    /// An admin rejects a join request, or the invitee declines
    Reject,
    /// An admin withdraws a sent invitation
    Revoke,
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Reject => write!(f, "reject"),
            Self::Revoke => write!(f, "revoke"),
        }
    }
}

/// Invitation state machine
pub struct InvitationStateMachine;

impl InvitationStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: InvitationState,
        event: InvitationEvent,
    ) -> Result<InvitationState, StateError> {
        // Check for terminal state
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let next = match (&current, &event) {
            (InvitationState::Pending, InvitationEvent::Accept) => InvitationState::Accepted,
            (InvitationState::Pending, InvitationEvent::Reject) => InvitationState::Rejected,
            (InvitationState::Pending, InvitationEvent::Revoke) => InvitationState::Revoked,

            // Invalid transitions
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: InvitationState, event: &InvitationEvent) -> bool {
        Self::transition(current, *event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pending_to_accepted() {
        let result =
            InvitationStateMachine::transition(InvitationState::Pending, InvitationEvent::Accept);
        assert_eq!(result, Ok(InvitationState::Accepted));
    }

    #[test]
    fn test_valid_pending_to_rejected() {
        let result =
            InvitationStateMachine::transition(InvitationState::Pending, InvitationEvent::Reject);
        assert_eq!(result, Ok(InvitationState::Rejected));
    }

    #[test]
    fn test_valid_pending_to_revoked() {
        let result =
            InvitationStateMachine::transition(InvitationState::Pending, InvitationEvent::Revoke);
        assert_eq!(result, Ok(InvitationState::Revoked));
    }

    #[test]
    fn test_terminal_accepted_cannot_transition() {
        let result =
            InvitationStateMachine::transition(InvitationState::Accepted, InvitationEvent::Revoke);
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_terminal_rejected_cannot_transition() {
        let result =
            InvitationStateMachine::transition(InvitationState::Rejected, InvitationEvent::Accept);
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_terminal_revoked_cannot_transition() {
        let result =
            InvitationStateMachine::transition(InvitationState::Revoked, InvitationEvent::Accept);
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_is_terminal() {
        assert!(!InvitationState::Pending.is_terminal());
        assert!(InvitationState::Accepted.is_terminal());
        assert!(InvitationState::Rejected.is_terminal());
        assert!(InvitationState::Revoked.is_terminal());
    }

    #[test]
    fn test_valid_transitions_from_pending() {
        // Kill mutant: InvitationState::valid_transitions -> empty slice
        let pending = InvitationState::Pending.valid_transitions();
        assert_eq!(pending.len(), 3);
        assert!(pending.contains(&InvitationState::Accepted));
        assert!(pending.contains(&InvitationState::Rejected));
        assert!(pending.contains(&InvitationState::Revoked));

        // Terminal states should have no transitions
        assert!(InvitationState::Accepted.valid_transitions().is_empty());
        assert!(InvitationState::Rejected.valid_transitions().is_empty());
        assert!(InvitationState::Revoked.valid_transitions().is_empty());
    }

    #[test]
    fn test_can_transition() {
        // Kill mutant: InvitationStateMachine::can_transition -> true / false
        assert!(InvitationStateMachine::can_transition(
            InvitationState::Pending,
            &InvitationEvent::Accept
        ));
        assert!(InvitationStateMachine::can_transition(
            InvitationState::Pending,
            &InvitationEvent::Reject
        ));
        assert!(InvitationStateMachine::can_transition(
            InvitationState::Pending,
            &InvitationEvent::Revoke
        ));

        assert!(!InvitationStateMachine::can_transition(
            InvitationState::Accepted,
            &InvitationEvent::Revoke
        ));
        assert!(!InvitationStateMachine::can_transition(
            InvitationState::Rejected,
            &InvitationEvent::Accept
        ));
        assert!(!InvitationStateMachine::can_transition(
            InvitationState::Revoked,
            &InvitationEvent::Accept
        ));
    }

    #[test]
    fn test_state_display_roundtrip() {
        assert_eq!(InvitationState::Pending.to_string(), "pending");
        assert_eq!(InvitationState::Accepted.to_string(), "accepted");
        assert_eq!(InvitationState::Rejected.to_string(), "rejected");
        assert_eq!(InvitationState::Revoked.to_string(), "revoked");
    }
}
