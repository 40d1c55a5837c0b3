//! User-facing status messages for the role screens.

use rolegate_core::types::DbId;

pub fn role_created(name: &str) -> String {
    format!("Role \"{name}\" created.")
}

pub fn role_updated(name: &str) -> String {
    format!("Role \"{name}\" updated.")
}

pub fn role_deleted(name: &str) -> String {
    format!("Role \"{name}\" deleted.")
}

pub fn role_not_found(id: DbId) -> String {
    format!("Role {id} not found.")
}
