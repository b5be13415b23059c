//! Common state machine error types
//!
//! Shared by every domain crate that models a lifecycle as a state machine.

use thiserror::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} to {to} via {event}")]
    InvalidTransition {
        from: String,
        to: String,
        event: String,
    },

    #[error("Guard condition failed: {0}")]
    GuardFailed(String),

    #[error("Terminal state: {0} is a terminal state and cannot transition")]
    TerminalState(String),
}

impl StateError {
    /// Invalid transition where the target is not defined for the event
    pub fn no_transition(from: impl std::fmt::Display, event: impl std::fmt::Display) -> Self {
        StateError::InvalidTransition {
            from: from.to_string(),
            to: "unknown".to_string(),
            event: event.to_string(),
        }
    }
}
