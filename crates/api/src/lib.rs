//! Rolegate API server library.
//!
//! Exposes the building blocks (config, state, error handling, the role
//! administration screens and the toolbar widget) so integration tests and
//! the binary entrypoint can both access them.

pub mod auth;
pub mod authorization;
pub mod config;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod messages;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod toolbar;
pub mod view;
