//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation.
//! - [`session`] -- the per-request [`session::Authentication`] view used by
//!   the toolbar widget.

pub mod jwt;
pub mod session;
