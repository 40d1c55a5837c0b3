//! Repository for the `groups` table (read-only).

use rolegate_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::Group;

/// Provides read operations for groups.
pub struct GroupRepo;

impl GroupRepo {
    /// Groups a user belongs to, ordered by name.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as::<_, Group>(
            "SELECT g.id, g.name, g.description
             FROM groups g
             JOIN user_groups ug ON ug.group_id = g.id
             WHERE ug.user_id = $1
             ORDER BY g.name ASC, g.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
