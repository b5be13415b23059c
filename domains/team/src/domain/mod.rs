//! Domain layer for the team domain

pub mod entities;
pub mod state;
