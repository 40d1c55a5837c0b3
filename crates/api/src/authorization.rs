//! Authorization service: the admin surface's only entry point to role data.
//!
//! Forwards to the injected [`RoleStore`] and owns the edit-form policy of
//! reporting field and permission errors together before any write.

use std::collections::BTreeMap;
use std::sync::Arc;

use rolegate_core::error::CoreError;
use rolegate_core::permissions::{self, validate_permission, Permission};
use rolegate_core::roles::RoleInput;
use rolegate_core::types::DbId;
use rolegate_core::validation::FieldErrors;
use rolegate_db::models::role::Role;
use rolegate_db::{RoleStore, StoreResult};

pub struct AuthorizationService {
    store: Arc<dyn RoleStore>,
}

impl AuthorizationService {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// The full permission catalog, for the edit form's checkbox list.
    pub fn permissions(&self) -> &'static [Permission] {
        permissions::CATALOG
    }

    pub async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        self.store.list_roles().await
    }

    pub async fn search_roles(&self, term: &str) -> StoreResult<Vec<Role>> {
        self.store.search_roles(term).await
    }

    pub async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>> {
        self.store.find_role(id).await
    }

    pub async fn role_permissions(&self, role_id: DbId) -> StoreResult<Vec<String>> {
        self.store.get_permissions_for_role(role_id).await
    }

    pub async fn permissions_by_role(&self) -> StoreResult<BTreeMap<DbId, Vec<String>>> {
        self.store.permissions_by_role().await
    }

    pub async fn create_role(&self, input: &RoleInput) -> StoreResult<DbId> {
        let id = self.store.create_role(input).await?;
        tracing::info!(role_id = id, name = %input.name.trim(), "Role created");
        Ok(id)
    }

    pub async fn update_role(&self, id: DbId, input: &RoleInput) -> StoreResult<()> {
        self.store.update_role(id, input).await?;
        tracing::info!(role_id = id, name = %input.name.trim(), "Role updated");
        Ok(())
    }

    /// Delete a role, returning the row as it was before deletion.
    pub async fn delete_role(&self, id: DbId) -> StoreResult<Role> {
        let role = self
            .store
            .find_role(id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Role", id })?;
        self.store.delete_role(id).await?;
        tracing::info!(role_id = id, name = %role.name, "Role deleted");
        Ok(role)
    }

    /// Replace a role's permissions with exactly `keys`.
    ///
    /// The store checks every key and swaps the set in one step, so a failed
    /// call leaves the previous set in place. Returns the stored set.
    pub async fn set_role_permissions(
        &self,
        role_id: DbId,
        keys: &[String],
    ) -> StoreResult<Vec<String>> {
        self.store.replace_permissions(role_id, keys).await?;

        let stored = self.store.get_permissions_for_role(role_id).await?;
        tracing::info!(role_id, permissions = ?stored, "Role permissions replaced");
        Ok(stored)
    }

    /// The edit-form submit: update fields, then replace the permission set.
    ///
    /// Permission keys are checked up front so a bad selection leaves the
    /// role untouched.
    pub async fn edit_role(
        &self,
        id: DbId,
        input: &RoleInput,
        keys: &[String],
    ) -> StoreResult<Vec<String>> {
        let mut errors = match input.validated() {
            Ok(_) => FieldErrors::new(),
            Err(CoreError::InvalidFields(errors)) => errors,
            Err(other) => return Err(other.into()),
        };
        if let Err(CoreError::InvalidFields(perm_errors)) = check_permission_keys(keys) {
            for (field, message) in perm_errors.iter() {
                errors.add(field, message);
            }
        }
        if !errors.is_empty() {
            return Err(CoreError::InvalidFields(errors).into());
        }

        self.update_role(id, input).await?;
        self.set_role_permissions(id, keys).await
    }
}

/// Reject the first key that is not part of the catalog.
fn check_permission_keys(keys: &[String]) -> Result<(), CoreError> {
    keys.iter().try_for_each(|key| validate_permission(key))
}
