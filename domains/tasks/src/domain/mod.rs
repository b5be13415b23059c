//! Domain layer for the tasks domain

pub mod entities;
pub mod state;
