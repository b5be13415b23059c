//! Properties domain layer: entities and inline image validation

pub mod entities;
pub mod image;
