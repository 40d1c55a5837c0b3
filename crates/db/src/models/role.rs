//! Role entity model.

use rolegate_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A role row from the `roles` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `role_permissions` link table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RolePermission {
    pub role_id: DbId,
    pub permission: String,
}
