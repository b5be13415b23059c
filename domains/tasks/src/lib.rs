//! Tasks domain: task lifecycle, task events, maintenance requests

pub mod api;
pub mod domain;
pub mod repository;

pub use domain::entities::*;
pub use domain::state::{
    MaintenanceEvent, MaintenanceState, MaintenanceStateMachine, TaskEvent, TaskState,
    TaskStateMachine,
};

pub use repository::{
    MaintenanceRequestRepository, TaskEventRepository, TaskRepository, TasksRepositories,
};

pub use api::routes;
pub use api::TasksState;
