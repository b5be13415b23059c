//! Domain entities for the tasks domain

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use propdesk_access::PropertyScoped;
use propdesk_common::{Error, Result};

use crate::domain::state::{
    MaintenanceEvent, MaintenanceState, MaintenanceStateMachine, TaskEvent, TaskState,
    TaskStateMachine,
};

/// Stored task status. Serialized with the labels clients display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Awaiting Approval")]
    AwaitingApproval,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Rejected")]
    Rejected,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        self.to_state().is_terminal()
    }

    /// Convert to state machine state
    pub fn to_state(&self) -> TaskState {
        match self {
            TaskStatus::Pending => TaskState::Pending,
            TaskStatus::InProgress => TaskState::InProgress,
            TaskStatus::AwaitingApproval => TaskState::AwaitingApproval,
            TaskStatus::Completed => TaskState::Completed,
            TaskStatus::Rejected => TaskState::Rejected,
        }
    }

    /// Create from state machine state
    pub fn from_state(state: TaskState) -> Self {
        match state {
            TaskState::Pending => TaskStatus::Pending,
            TaskState::InProgress => TaskStatus::InProgress,
            TaskState::AwaitingApproval => TaskStatus::AwaitingApproval,
            TaskState::Completed => TaskStatus::Completed,
            TaskState::Rejected => TaskStatus::Rejected,
        }
    }

    /// Get valid next statuses from current status
    pub fn valid_transitions(&self) -> Vec<TaskStatus> {
        self.to_state()
            .valid_transitions()
            .iter()
            .map(|s| TaskStatus::from_state(*s))
            .collect()
    }
}

/// Status values accepted from the task edit form.
///
/// Hold and Overdue are labels only; both are stored as Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskFormStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Hold")]
    Hold,
    #[serde(rename = "Overdue")]
    Overdue,
}

impl From<TaskFormStatus> for TaskStatus {
    fn from(status: TaskFormStatus) -> Self {
        match status {
            TaskFormStatus::InProgress => TaskStatus::InProgress,
            TaskFormStatus::Pending | TaskFormStatus::Hold | TaskFormStatus::Overdue => {
                TaskStatus::Pending
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Work item tied to a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub property_id: Uuid,
    /// Property title at the time the task was written
    pub property: String,
    pub unit_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub completion_date: Option<DateTime<Utc>>,
    pub completion_file: Option<String>,
    pub completed_by: Option<Uuid>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a caller supplies when creating a task
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub unit_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

impl Task {
    /// Create a new pending task
    pub fn new(
        property_id: Uuid,
        property_title: String,
        draft: TaskDraft,
        created_by: Uuid,
    ) -> Result<Self> {
        let title = Self::validate_title(&draft.title)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            property_id,
            property: property_title,
            unit_id: draft.unit_id,
            title,
            description: draft.description,
            priority: draft.priority,
            status: TaskStatus::Pending,
            due_date: draft.due_date,
            assigned_to: draft.assigned_to,
            created_by,
            completion_date: None,
            completion_file: None,
            completed_by: None,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_title(title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Task title is required".to_string()));
        }
        Ok(title.to_string())
    }

    /// Edit details. Only pending or in-progress tasks can be edited, and
    /// the status can only move between those two.
    pub fn edit(&mut self, status: Option<TaskFormStatus>) -> Result<()> {
        if !self.status.to_state().is_editable() {
            return Err(Error::Conflict(format!(
                "Task is {} and can no longer be edited",
                self.status.to_state()
            )));
        }
        if let Some(status) = status {
            self.status = status.into();
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        let new_state = self.apply_transition(TaskEvent::Start)?;
        self.status = TaskStatus::from_state(new_state);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Submit the work for approval
    pub fn submit(&mut self, actor: Uuid, completion_file: Option<String>) -> Result<()> {
        let new_state = self.apply_transition(TaskEvent::Submit)?;
        let now = Utc::now();
        self.status = TaskStatus::from_state(new_state);
        self.completion_date = Some(now);
        self.completion_file = completion_file;
        self.completed_by = Some(actor);
        self.rejection_reason = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn approve(&mut self, actor: Uuid) -> Result<()> {
        let new_state = self.apply_transition(TaskEvent::Approve)?;
        let now = Utc::now();
        self.status = TaskStatus::from_state(new_state);
        self.approved_by = Some(actor);
        self.approved_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Send the work back to the assignee
    pub fn reject(&mut self, reason: String) -> Result<()> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(Error::Validation(
                "A rejection reason is required".to_string(),
            ));
        }
        let new_state = self.apply_transition(TaskEvent::Reject)?;
        self.status = TaskStatus::from_state(new_state);
        self.rejection_reason = Some(reason);
        self.completion_date = None;
        self.completion_file = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn apply_transition(&self, event: TaskEvent) -> Result<TaskState> {
        Ok(TaskStateMachine::transition(self.status.to_state(), event)?)
    }
}

impl PropertyScoped for Task {
    fn scope_property_id(&self) -> Uuid {
        self.property_id
    }
}

/// Kind of entry in a task's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_event_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskEventType {
    Created,
    Started,
    Submitted,
    Approved,
    Rejected,
    /// Put back to Pending by an edit (Hold, Overdue or Pending)
    Paused,
}

impl TaskEventType {
    /// History entry for a status change made by editing the task;
    /// `None` when the status did not change.
    pub fn for_edit(from: TaskStatus, to: TaskStatus) -> Option<Self> {
        match to {
            _ if from == to => None,
            TaskStatus::InProgress => Some(TaskEventType::Started),
            _ => Some(TaskEventType::Paused),
        }
    }
}

impl From<TaskEvent> for TaskEventType {
    fn from(event: TaskEvent) -> Self {
        match event {
            TaskEvent::Start => TaskEventType::Started,
            TaskEvent::Submit => TaskEventType::Submitted,
            TaskEvent::Approve => TaskEventType::Approved,
            TaskEvent::Reject => TaskEventType::Rejected,
        }
    }
}

/// Append-only history row, one per applied transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskEventRecord {
    pub id: Uuid,
    pub task_id: Uuid,
    pub sequence: i64,
    pub event_type: TaskEventType,
    pub from_status: Option<TaskStatus>,
    pub to_status: TaskStatus,
    pub actor_id: Uuid,
    pub payload: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "maintenance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl MaintenanceStatus {
    pub fn to_state(&self) -> MaintenanceState {
        match self {
            MaintenanceStatus::Pending => MaintenanceState::Pending,
            MaintenanceStatus::Approved => MaintenanceState::Approved,
            MaintenanceStatus::Rejected => MaintenanceState::Rejected,
        }
    }

    pub fn from_state(state: MaintenanceState) -> Self {
        match state {
            MaintenanceState::Pending => MaintenanceStatus::Pending,
            MaintenanceState::Approved => MaintenanceStatus::Approved,
            MaintenanceState::Rejected => MaintenanceStatus::Rejected,
        }
    }
}

/// Request filed (usually by a tenant) for work on a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub requested_by: Uuid,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
    pub status: MaintenanceStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    /// Task created when the request was approved
    pub task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn new(
        property_id: Uuid,
        unit_id: Option<Uuid>,
        requested_by: Uuid,
        title: String,
        description: String,
        priority: TaskPriority,
    ) -> Result<Self> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("Request title is required".to_string()));
        }
        let description = description.trim().to_string();
        if description.is_empty() {
            return Err(Error::Validation(
                "Request description is required".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            property_id,
            unit_id,
            requested_by,
            title,
            description,
            priority,
            status: MaintenanceStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
            task_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Approve and build the task that carries out the work
    pub fn approve(&mut self, reviewer: Uuid, property_title: String) -> Result<Task> {
        let new_state = self.apply_transition(MaintenanceEvent::Approve)?;
        let task = Task::new(
            self.property_id,
            property_title,
            TaskDraft {
                unit_id: self.unit_id,
                title: self.title.clone(),
                description: Some(self.description.clone()),
                priority: self.priority,
                ..TaskDraft::default()
            },
            reviewer,
        )?;
        self.mark_reviewed(new_state, reviewer);
        self.task_id = Some(task.id);
        Ok(task)
    }

    pub fn reject(&mut self, reviewer: Uuid, reason: Option<String>) -> Result<()> {
        let new_state = self.apply_transition(MaintenanceEvent::Reject)?;
        self.mark_reviewed(new_state, reviewer);
        self.rejection_reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Ok(())
    }

    fn mark_reviewed(&mut self, state: MaintenanceState, reviewer: Uuid) {
        let now = Utc::now();
        self.status = MaintenanceStatus::from_state(state);
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }

    fn apply_transition(&self, event: MaintenanceEvent) -> Result<MaintenanceState> {
        Ok(MaintenanceStateMachine::transition(
            self.status.to_state(),
            event,
        )?)
    }
}

impl PropertyScoped for MaintenanceRequest {
    fn scope_property_id(&self) -> Uuid {
        self.property_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> Task {
        Task::new(
            Uuid::new_v4(),
            "Downtown Apartments".to_string(),
            TaskDraft {
                title: "Fix leaking faucet".to_string(),
                ..TaskDraft::default()
            },
            Uuid::new_v4(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_task_is_pending() {
        let t = task();
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.priority, TaskPriority::Medium);
        assert_eq!(t.property, "Downtown Apartments");
        assert!(t.completion_date.is_none());
    }

    #[test]
    fn test_new_task_requires_title() {
        let err = Task::new(
            Uuid::new_v4(),
            "Oak House".to_string(),
            TaskDraft {
                title: "   ".to_string(),
                ..TaskDraft::default()
            },
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_submit_sets_completion_metadata() {
        let mut t = task();
        let worker = Uuid::new_v4();
        t.rejection_reason = Some("stale".to_string());
        t.submit(worker, Some("https://files.example.com/photo.jpg".to_string()))
            .unwrap();

        assert_eq!(t.status, TaskStatus::AwaitingApproval);
        assert!(t.completion_date.is_some());
        assert_eq!(
            t.completion_file.as_deref(),
            Some("https://files.example.com/photo.jpg")
        );
        assert_eq!(t.completed_by, Some(worker));
        assert!(t.rejection_reason.is_none());
    }

    #[test]
    fn test_approve_sets_approver() {
        let mut t = task();
        t.submit(Uuid::new_v4(), None).unwrap();
        let lead = Uuid::new_v4();
        t.approve(lead).unwrap();

        assert_eq!(t.status, TaskStatus::Completed);
        assert_eq!(t.approved_by, Some(lead));
        assert!(t.approved_at.is_some());
        assert!(t.status.is_terminal());
    }

    #[test]
    fn test_second_approve_conflicts() {
        let mut t = task();
        t.submit(Uuid::new_v4(), None).unwrap();
        t.approve(Uuid::new_v4()).unwrap();
        let first = t.clone();

        let err = t.approve(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(t, first);
    }

    #[test]
    fn test_reject_clears_completion() {
        let mut t = task();
        t.submit(Uuid::new_v4(), Some("photo.jpg".to_string()))
            .unwrap();
        t.reject("  Still dripping  ".to_string()).unwrap();

        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.rejection_reason.as_deref(), Some("Still dripping"));
        assert!(t.completion_date.is_none());
        assert!(t.completion_file.is_none());
    }

    #[test]
    fn test_reject_requires_reason() {
        let mut t = task();
        t.submit(Uuid::new_v4(), None).unwrap();
        let err = t.reject(" ".to_string()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(t.status, TaskStatus::AwaitingApproval);
    }

    #[test]
    fn test_approve_from_pending_conflicts() {
        let mut t = task();
        let err = t.approve(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(t.approved_by.is_none());
    }

    #[test]
    fn test_rejected_row_can_be_resubmitted() {
        let mut t = task();
        t.status = TaskStatus::Rejected;
        t.submit(Uuid::new_v4(), None).unwrap();
        assert_eq!(t.status, TaskStatus::AwaitingApproval);
    }

    #[test]
    fn test_edit_maps_form_statuses() {
        let mut t = task();
        t.edit(Some(TaskFormStatus::InProgress)).unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        t.edit(Some(TaskFormStatus::Hold)).unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
        t.edit(Some(TaskFormStatus::Overdue)).unwrap();
        assert_eq!(t.status, TaskStatus::Pending);
    }

    #[test]
    fn test_edit_locked_after_submit() {
        let mut t = task();
        t.submit(Uuid::new_v4(), None).unwrap();
        let err = t.edit(Some(TaskFormStatus::Pending)).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(t.status, TaskStatus::AwaitingApproval);
    }

    #[test]
    fn test_status_wire_labels() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::AwaitingApproval).unwrap(),
            "\"Awaiting Approval\""
        );
        let status: TaskFormStatus = serde_json::from_str("\"Hold\"").unwrap();
        assert_eq!(TaskStatus::from(status), TaskStatus::Pending);
        assert!(serde_json::from_str::<TaskFormStatus>("\"Completed\"").is_err());
    }

    #[test]
    fn test_status_valid_transitions() {
        assert_eq!(
            TaskStatus::AwaitingApproval.valid_transitions(),
            vec![TaskStatus::Completed, TaskStatus::InProgress]
        );
        assert!(TaskStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn test_event_type_from_event() {
        assert_eq!(TaskEventType::from(TaskEvent::Submit), TaskEventType::Submitted);
        assert_eq!(TaskEventType::from(TaskEvent::Reject), TaskEventType::Rejected);
    }

    #[test]
    fn test_edit_status_changes_are_recorded() {
        use TaskStatus::{InProgress, Pending};
        assert_eq!(TaskEventType::for_edit(Pending, Pending), None);
        assert_eq!(TaskEventType::for_edit(InProgress, InProgress), None);
        assert_eq!(
            TaskEventType::for_edit(Pending, InProgress),
            Some(TaskEventType::Started)
        );
        assert_eq!(
            TaskEventType::for_edit(InProgress, Pending),
            Some(TaskEventType::Paused)
        );
        assert_eq!(
            serde_json::to_value(TaskEventType::Paused).unwrap(),
            serde_json::json!("paused")
        );
    }

    fn request() -> MaintenanceRequest {
        MaintenanceRequest::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            "Broken heater".to_string(),
            "No heat in the bedroom".to_string(),
            TaskPriority::High,
        )
        .unwrap()
    }

    #[test]
    fn test_maintenance_request_requires_description() {
        let err = MaintenanceRequest::new(
            Uuid::new_v4(),
            None,
            Uuid::new_v4(),
            "Broken heater".to_string(),
            "".to_string(),
            TaskPriority::Low,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_approving_request_builds_pending_task() {
        let mut req = request();
        let lead = Uuid::new_v4();
        let task = req.approve(lead, "Riverside Lofts".to_string()).unwrap();

        assert_eq!(req.status, MaintenanceStatus::Approved);
        assert_eq!(req.reviewed_by, Some(lead));
        assert_eq!(req.task_id, Some(task.id));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.property_id, req.property_id);
        assert_eq!(task.property, "Riverside Lofts");
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.created_by, lead);
    }

    #[test]
    fn test_reviewed_request_is_final() {
        let mut req = request();
        req.reject(Uuid::new_v4(), Some("Duplicate".to_string()))
            .unwrap();
        assert_eq!(req.status, MaintenanceStatus::Rejected);
        assert_eq!(req.rejection_reason.as_deref(), Some("Duplicate"));

        let err = req.approve(Uuid::new_v4(), "x".to_string()).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(req.task_id.is_none());
    }
}
