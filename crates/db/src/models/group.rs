//! Group entity model (read-only here).

use rolegate_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A group row from the `groups` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Group {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}
