//! Invitation state machine
//!
//! The state is derived from the invitation's timestamps rather than stored.
//! Pending is the only state with outgoing transitions.

use propdesk_common::StateError;
use serde::{Deserialize, Serialize};

/// Derived invitation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationState {
    Pending,
    Accepted,
    Declined,
    Expired,
    Revoked,
}

impl InvitationState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [InvitationState] {
        match self {
            Self::Pending => &[Self::Accepted, Self::Declined, Self::Expired, Self::Revoked],
            Self::Accepted | Self::Declined | Self::Expired | Self::Revoked => &[],
        }
    }
}

impl std::fmt::Display for InvitationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Declined => write!(f, "declined"),
            Self::Expired => write!(f, "expired"),
            Self::Revoked => write!(f, "revoked"),
        }
    }
}

/// Events that trigger invitation state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvitationEvent {
    /// Invitee accepts and takes on the invited role
    Accept,
    /// Invitee turns the invitation down
    Decline,
    /// `expires_at` has passed
    Expire,
    /// A manager withdraws the invitation
    Revoke,
}

impl std::fmt::Display for InvitationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accept => write!(f, "accept"),
            Self::Decline => write!(f, "decline"),
            Self::Expire => write!(f, "expire"),
            Self::Revoke => write!(f, "revoke"),
        }
    }
}

/// Guard context for invitation transitions
#[derive(Debug, Clone)]
pub struct InvitationGuardContext {
    pub is_expired: bool,
}

pub struct InvitationStateMachine;

impl InvitationStateMachine {
    /// Attempt a state transition with guard conditions
    pub fn transition(
        current: InvitationState,
        event: InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> Result<InvitationState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        let expired = context.is_some_and(|ctx| ctx.is_expired);

        match event {
            InvitationEvent::Accept if expired => Err(StateError::GuardFailed(
                "Cannot accept expired invitation".to_string(),
            )),
            InvitationEvent::Accept => Ok(InvitationState::Accepted),
            InvitationEvent::Decline => Ok(InvitationState::Declined),
            InvitationEvent::Expire => Ok(InvitationState::Expired),
            InvitationEvent::Revoke => Ok(InvitationState::Revoked),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(
        current: InvitationState,
        event: &InvitationEvent,
        context: Option<&InvitationGuardContext>,
    ) -> bool {
        Self::transition(current, *event, context).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [InvitationEvent; 4] = [
        InvitationEvent::Accept,
        InvitationEvent::Decline,
        InvitationEvent::Expire,
        InvitationEvent::Revoke,
    ];

    #[test]
    fn test_pending_transitions() {
        let ctx = InvitationGuardContext { is_expired: false };
        let cases = [
            (InvitationEvent::Accept, InvitationState::Accepted),
            (InvitationEvent::Decline, InvitationState::Declined),
            (InvitationEvent::Expire, InvitationState::Expired),
            (InvitationEvent::Revoke, InvitationState::Revoked),
        ];
        for (event, expected) in cases {
            assert_eq!(
                InvitationStateMachine::transition(InvitationState::Pending, event, Some(&ctx)),
                Ok(expected)
            );
        }
    }

    #[test]
    fn test_guard_fails_accept_expired_invitation() {
        let ctx = InvitationGuardContext { is_expired: true };
        let result = InvitationStateMachine::transition(
            InvitationState::Pending,
            InvitationEvent::Accept,
            Some(&ctx),
        );
        assert!(matches!(result, Err(StateError::GuardFailed(_))));

        // Revoking a lapsed invitation is still allowed
        assert!(InvitationStateMachine::can_transition(
            InvitationState::Pending,
            &InvitationEvent::Revoke,
            Some(&ctx)
        ));
    }

    #[test]
    fn test_terminal_states_reject_every_event() {
        for state in [
            InvitationState::Accepted,
            InvitationState::Declined,
            InvitationState::Expired,
            InvitationState::Revoked,
        ] {
            assert!(state.is_terminal());
            assert!(state.valid_transitions().is_empty());
            for event in ALL_EVENTS {
                let result = InvitationStateMachine::transition(state, event, None);
                assert!(matches!(result, Err(StateError::TerminalState(_))));
            }
        }
    }

    #[test]
    fn test_pending_valid_transitions() {
        let pending = InvitationState::Pending.valid_transitions();
        assert_eq!(pending.len(), 4);
        assert!(!InvitationState::Pending.is_terminal());
        assert!(pending.contains(&InvitationState::Expired));
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InvitationState::Revoked).unwrap(),
            "\"revoked\""
        );
    }
}
