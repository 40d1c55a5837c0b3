//! Storage seams used by the HTTP layer.
//!
//! [`RoleStore`] owns roles and their permission links; [`UserDirectory`] is
//! the read-only view of users and groups. Handlers hold these as trait
//! objects so the backend is chosen once at startup.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use rolegate_core::error::CoreError;
use rolegate_core::permissions::validate_permission;
use rolegate_core::roles::{duplicate_name_error, RoleInput};
use rolegate_core::types::DbId;
use sqlx::PgPool;

use crate::error::{is_unique_violation, StoreError, StoreResult};
use crate::models::group::Group;
use crate::models::role::Role;
use crate::models::user::User;
use crate::repositories::{GroupRepo, RolePermissionRepo, RoleRepo, UserRepo};

/// Name of the unique constraint on `roles.name`.
const ROLE_NAME_CONSTRAINT: &str = "uq_roles_name";

/// Role records and role-permission links.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// All roles ordered by name ascending.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>>;

    /// Exact, case-sensitive name lookup.
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;

    /// Roles whose name or description contains `term`, case-insensitively,
    /// ordered by name.
    async fn search_roles(&self, term: &str) -> StoreResult<Vec<Role>>;

    /// Validate and insert a role, returning its id.
    async fn create_role(&self, input: &RoleInput) -> StoreResult<DbId>;

    /// Validate and overwrite a role's name and description.
    async fn update_role(&self, id: DbId, input: &RoleInput) -> StoreResult<()>;

    /// Delete a role and every link that references it.
    async fn delete_role(&self, id: DbId) -> StoreResult<()>;

    /// Permission keys granted to a role, sorted. Empty for unknown roles.
    async fn get_permissions_for_role(&self, role_id: DbId) -> StoreResult<Vec<String>>;

    /// Idempotently link a catalog permission to an existing role.
    async fn add_permission_to_role(&self, permission: &str, role_id: DbId) -> StoreResult<()>;

    async fn remove_all_permissions_from_role(&self, role_id: DbId) -> StoreResult<()>;

    /// Atomically replace a role's permissions with exactly `permissions`.
    ///
    /// Every key is checked against the catalog before anything is written;
    /// duplicates collapse. On any error the previous set is left intact.
    async fn replace_permissions(&self, role_id: DbId, permissions: &[String]) -> StoreResult<()>;

    /// Granted keys for every role that has at least one.
    async fn permissions_by_role(&self) -> StoreResult<BTreeMap<DbId, Vec<String>>>;

    /// Roles assigned to a user, ordered by name.
    async fn get_roles_for_user(&self, user_id: DbId) -> StoreResult<Vec<Role>>;
}

/// Read-only access to users and their groups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>>;

    /// Groups the user belongs to, ordered by name.
    async fn get_groups_for_user(&self, user_id: DbId) -> StoreResult<Vec<Group>>;
}

pub(crate) fn role_not_found(id: DbId) -> StoreError {
    StoreError::Core(CoreError::NotFound { entity: "Role", id })
}

/// Check every key against the catalog and return the distinct keys, sorted.
pub(crate) fn distinct_permissions(permissions: &[String]) -> Result<Vec<&str>, CoreError> {
    let unique: BTreeSet<&str> = permissions.iter().map(String::as_str).collect();
    for key in &unique {
        validate_permission(key)?;
    }
    Ok(unique.into_iter().collect())
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// PostgreSQL-backed store built on the sqlx repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Turn a unique violation on `roles.name` into the form-level error.
fn map_role_write_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err, ROLE_NAME_CONSTRAINT) {
        StoreError::Core(duplicate_name_error())
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(RoleRepo::list(&self.pool).await?)
    }

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>> {
        Ok(RoleRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        Ok(RoleRepo::find_by_name(&self.pool, name).await?)
    }

    async fn search_roles(&self, term: &str) -> StoreResult<Vec<Role>> {
        Ok(RoleRepo::search(&self.pool, term).await?)
    }

    async fn create_role(&self, input: &RoleInput) -> StoreResult<DbId> {
        let input = input.validated()?;
        if RoleRepo::find_by_name(&self.pool, &input.name).await?.is_some() {
            return Err(duplicate_name_error().into());
        }

        let role = RoleRepo::create(&self.pool, &input)
            .await
            .map_err(map_role_write_error)?;
        tracing::debug!(role_id = role.id, name = %role.name, "Inserted role");
        Ok(role.id)
    }

    async fn update_role(&self, id: DbId, input: &RoleInput) -> StoreResult<()> {
        let input = input.validated()?;
        if RoleRepo::find_by_id(&self.pool, id).await?.is_none() {
            return Err(role_not_found(id));
        }
        if let Some(other) = RoleRepo::find_by_name(&self.pool, &input.name).await? {
            if other.id != id {
                return Err(duplicate_name_error().into());
            }
        }

        RoleRepo::update(&self.pool, id, &input)
            .await
            .map_err(map_role_write_error)?
            .ok_or_else(|| role_not_found(id))?;
        Ok(())
    }

    async fn delete_role(&self, id: DbId) -> StoreResult<()> {
        if RoleRepo::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(role_not_found(id))
        }
    }

    async fn get_permissions_for_role(&self, role_id: DbId) -> StoreResult<Vec<String>> {
        Ok(RolePermissionRepo::list_for_role(&self.pool, role_id).await?)
    }

    async fn add_permission_to_role(&self, permission: &str, role_id: DbId) -> StoreResult<()> {
        validate_permission(permission)?;
        if RoleRepo::find_by_id(&self.pool, role_id).await?.is_none() {
            return Err(role_not_found(role_id));
        }
        RolePermissionRepo::add(&self.pool, role_id, permission).await?;
        Ok(())
    }

    async fn remove_all_permissions_from_role(&self, role_id: DbId) -> StoreResult<()> {
        let removed = RolePermissionRepo::remove_all_for_role(&self.pool, role_id).await?;
        tracing::debug!(role_id, removed, "Cleared role permissions");
        Ok(())
    }

    async fn replace_permissions(&self, role_id: DbId, permissions: &[String]) -> StoreResult<()> {
        let keys = distinct_permissions(permissions)?;
        if !RolePermissionRepo::replace_for_role(&self.pool, role_id, &keys).await? {
            return Err(role_not_found(role_id));
        }
        Ok(())
    }

    async fn permissions_by_role(&self) -> StoreResult<BTreeMap<DbId, Vec<String>>> {
        let mut map: BTreeMap<DbId, Vec<String>> = BTreeMap::new();
        for link in RolePermissionRepo::list_all(&self.pool).await? {
            map.entry(link.role_id).or_default().push(link.permission);
        }
        Ok(map)
    }

    async fn get_roles_for_user(&self, user_id: DbId) -> StoreResult<Vec<Role>> {
        Ok(RoleRepo::list_for_user(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn get_groups_for_user(&self, user_id: DbId) -> StoreResult<Vec<Group>> {
        Ok(GroupRepo::list_for_user(&self.pool, user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::error::Error as StdError;

    use assert_matches::assert_matches;
    use rolegate_core::roles::NAME_NOT_UNIQUE_MESSAGE;
    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    /// Stand-in for a server-reported error carrying a SQLSTATE and constraint.
    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct ServerError {
        message: String,
        code: &'static str,
        constraint: Option<&'static str>,
    }

    impl DatabaseError for ServerError {
        fn message(&self) -> &str {
            &self.message
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.code))
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.code == "23505" {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::Other
            }
        }
    }

    fn server_error(code: &'static str, constraint: Option<&'static str>) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ServerError {
            message: format!("server error {code}"),
            code,
            constraint,
        }))
    }

    #[test]
    fn duplicate_role_name_becomes_field_error() {
        let mapped = map_role_write_error(server_error("23505", Some(ROLE_NAME_CONSTRAINT)));
        assert_matches!(
            mapped,
            StoreError::Core(CoreError::InvalidFields(ref errors))
                if errors.get("name") == Some(NAME_NOT_UNIQUE_MESSAGE)
        );
    }

    #[test]
    fn other_unique_constraints_stay_database_errors() {
        let mapped = map_role_write_error(server_error("23505", Some("uq_role_permissions")));
        assert_matches!(mapped, StoreError::Database(sqlx::Error::Database(_)));
    }

    #[test]
    fn non_unique_codes_are_not_unique_violations() {
        let err = server_error("23503", Some(ROLE_NAME_CONSTRAINT));
        assert!(!is_unique_violation(&err, ROLE_NAME_CONSTRAINT));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound, ROLE_NAME_CONSTRAINT));
        assert_matches!(map_role_write_error(err), StoreError::Database(_));
    }

    #[test]
    fn distinct_permissions_sorts_and_dedupes() {
        let keys = vec!["publish_posts".to_string(), "edit_posts".into(), "edit_posts".into()];
        assert_eq!(distinct_permissions(&keys).unwrap(), vec!["edit_posts", "publish_posts"]);

        let bad = vec!["edit_posts".to_string(), "launch_rockets".into()];
        assert_matches!(distinct_permissions(&bad), Err(CoreError::InvalidFields(_)));
    }
}
