//! Row structs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row.

pub mod group;
pub mod role;
pub mod user;
