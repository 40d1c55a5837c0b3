//! Request handlers.
//!
//! Each submodule provides async handler functions for one area of the
//! service. Handlers delegate to the services in [`crate::state::AppState`]
//! and map errors via [`crate::error::AppError`].

pub mod roles;
pub mod toolbar;
