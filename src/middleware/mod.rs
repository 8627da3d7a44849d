// src/middleware/mod.rs

pub mod auth;

pub use auth::{AuthenticatedUser, OrgContext, SESSION_COOKIE, auth_middleware};
