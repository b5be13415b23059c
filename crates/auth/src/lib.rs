//! Authentication for the PropDesk API
//!
//! Validates bearer JWTs, loads the caller's user row and team-member link,
//! and exposes them to handlers through axum extractors that work with any
//! domain state implementing `FromRef<S>` for `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;
mod types;

pub use backend::AuthBackend;
pub use claims::AccessClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AuthUser, ManagerUser};
pub use jwt::issue_token;
pub use types::AuthIdentity;
