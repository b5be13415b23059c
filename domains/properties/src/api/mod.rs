//! API layer for the properties domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::PropertiesState;
pub use routes::routes;
