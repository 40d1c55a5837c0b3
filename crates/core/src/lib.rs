//! Domain types shared by the storage and HTTP layers.
//!
//! This crate has no database or web dependencies so the role rules, the
//! permission catalog and the error taxonomy can be unit tested in isolation.

pub mod error;
pub mod permissions;
pub mod roles;
pub mod search;
pub mod types;
pub mod validation;
