//! Task and maintenance-request state machines
//!
//! Task lifecycle:
//!
//! ```text
//! Pending ────────start─────────► InProgress
//! Pending | InProgress | Rejected ──submit──► AwaitingApproval
//! AwaitingApproval ──approve──► Completed
//! AwaitingApproval ──reject───► InProgress
//! ```
//!
//! Completed is terminal. Nothing in the lifecycle produces Rejected; rows in
//! that state come from older data and may only be resubmitted.

use propdesk_common::StateError;
use serde::{Deserialize, Serialize};

/// Task lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    InProgress,
    AwaitingApproval,
    Completed,
    Rejected,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [TaskState] {
        match self {
            Self::Pending => &[Self::InProgress, Self::AwaitingApproval],
            Self::InProgress | Self::Rejected => &[Self::AwaitingApproval],
            Self::AwaitingApproval => &[Self::Completed, Self::InProgress],
            Self::Completed => &[],
        }
    }

    /// Whether the task's details may still be edited
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::AwaitingApproval => write!(f, "awaiting_approval"),
            Self::Completed => write!(f, "completed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Events that trigger task state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TaskEvent {
    /// Assignee begins work
    Start,
    /// Work submitted for approval
    Submit,
    /// Approver signs off
    Approve,
    /// Approver sends the work back
    Reject,
}

impl std::fmt::Display for TaskEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Submit => write!(f, "submit"),
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

pub struct TaskStateMachine;

impl TaskStateMachine {
    /// Attempt a state transition
    pub fn transition(current: TaskState, event: TaskEvent) -> Result<TaskState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (TaskState::Pending, TaskEvent::Start) => Ok(TaskState::InProgress),
            (
                TaskState::Pending | TaskState::InProgress | TaskState::Rejected,
                TaskEvent::Submit,
            ) => Ok(TaskState::AwaitingApproval),
            (TaskState::AwaitingApproval, TaskEvent::Approve) => Ok(TaskState::Completed),
            (TaskState::AwaitingApproval, TaskEvent::Reject) => Ok(TaskState::InProgress),
            (from, event) => Err(StateError::no_transition(from, event)),
        }
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: TaskState, event: &TaskEvent) -> bool {
        Self::transition(current, *event).is_ok()
    }
}

/// Maintenance request review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceState {
    Pending,
    Approved,
    Rejected,
}

impl MaintenanceState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for MaintenanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaintenanceEvent {
    Approve,
    Reject,
}

impl std::fmt::Display for MaintenanceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

pub struct MaintenanceStateMachine;

impl MaintenanceStateMachine {
    pub fn transition(
        current: MaintenanceState,
        event: MaintenanceEvent,
    ) -> Result<MaintenanceState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match event {
            MaintenanceEvent::Approve => Ok(MaintenanceState::Approved),
            MaintenanceEvent::Reject => Ok(MaintenanceState::Rejected),
        }
    }
}
