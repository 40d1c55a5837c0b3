//! Repository for the `role_permissions` link table.

use rolegate_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::RolePermission;

/// Provides link management between roles and catalog permissions.
pub struct RolePermissionRepo;

impl RolePermissionRepo {
    /// Permission keys granted to a role, sorted ascending.
    pub async fn list_for_role(pool: &PgPool, role_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT permission FROM role_permissions
             WHERE role_id = $1
             ORDER BY permission ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await
    }

    /// Every link in the table, ordered by role then permission.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RolePermission>, sqlx::Error> {
        sqlx::query_as::<_, RolePermission>(
            "SELECT role_id, permission FROM role_permissions
             ORDER BY role_id ASC, permission ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Link a permission to a role. Inserting an existing pair is a no-op.
    pub async fn add(pool: &PgPool, role_id: DbId, permission: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission)
             VALUES ($1, $2)
             ON CONFLICT (role_id, permission) DO NOTHING",
        )
        .bind(role_id)
        .bind(permission)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove every permission link for a role. Returns the number removed.
    pub async fn remove_all_for_role(pool: &PgPool, role_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Replace a role's permission set with exactly `permissions`, in one
    /// transaction.
    ///
    /// The role row is locked first; returns `false` (and writes nothing) when
    /// it does not exist.
    pub async fn replace_for_role(
        pool: &PgPool,
        role_id: DbId,
        permissions: &[&str],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = sqlx::query_scalar::<_, DbId>("SELECT id FROM roles WHERE id = $1 FOR UPDATE")
            .bind(role_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        for permission in permissions {
            sqlx::query(
                "INSERT INTO role_permissions (role_id, permission)
                 VALUES ($1, $2)
                 ON CONFLICT (role_id, permission) DO NOTHING",
            )
            .bind(role_id)
            .bind(*permission)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
