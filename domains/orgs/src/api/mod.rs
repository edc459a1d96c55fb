//! API layer for the organizations domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::{ActingUser, OrgsState};
pub use routes::routes;
