//! In-process store for tests and database-less local runs.
//!
//! Mirrors the PostgreSQL schema closely enough that the same behavioural
//! tests pass against both: ids start at 1, names are unique, deleting a
//! role cascades to its links, and lists are ordered by name.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use rolegate_core::permissions::validate_permission;
use rolegate_core::roles::{duplicate_name_error, RoleInput};
use rolegate_core::search::contains_ignore_case;
use rolegate_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::models::group::Group;
use crate::models::role::Role;
use crate::models::user::User;
use crate::store::{distinct_permissions, role_not_found, RoleStore, UserDirectory};

#[derive(Debug, Default)]
struct Tables {
    next_role_id: DbId,
    next_user_id: DbId,
    next_group_id: DbId,
    roles: BTreeMap<DbId, Role>,
    role_permissions: BTreeSet<(DbId, String)>,
    users: BTreeMap<DbId, User>,
    groups: BTreeMap<DbId, Group>,
    user_groups: BTreeSet<(DbId, DbId)>,
    user_roles: BTreeSet<(DbId, DbId)>,
}

fn next_id(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

fn sorted_by_name(mut roles: Vec<Role>) -> Vec<Role> {
    roles.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    roles
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<DbId>) -> bool {
        self.roles
            .values()
            .any(|r| r.name == name && Some(r.id) != except)
    }
}

/// Role store and user directory backed by in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user row, returning its id.
    pub async fn insert_user(&self, username: &str, email: &str) -> DbId {
        let mut t = self.tables.write().await;
        let id = next_id(&mut t.next_user_id);
        t.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
                is_active: true,
                created_at: Utc::now(),
            },
        );
        id
    }

    /// Insert a group row, returning its id.
    pub async fn insert_group(&self, name: &str, description: Option<&str>) -> DbId {
        let mut t = self.tables.write().await;
        let id = next_id(&mut t.next_group_id);
        t.groups.insert(
            id,
            Group {
                id,
                name: name.to_string(),
                description: description.map(str::to_string),
            },
        );
        id
    }

    pub async fn add_user_to_group(&self, user_id: DbId, group_id: DbId) {
        self.tables.write().await.user_groups.insert((user_id, group_id));
    }

    /// Link a user to a role. Ignored if the role does not exist.
    pub async fn assign_role_to_user(&self, user_id: DbId, role_id: DbId) {
        let mut t = self.tables.write().await;
        if t.roles.contains_key(&role_id) {
            t.user_roles.insert((user_id, role_id));
        }
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let t = self.tables.read().await;
        Ok(sorted_by_name(t.roles.values().cloned().collect()))
    }

    async fn find_role(&self, id: DbId) -> StoreResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let t = self.tables.read().await;
        Ok(t.roles.values().find(|r| r.name == name).cloned())
    }

    async fn search_roles(&self, term: &str) -> StoreResult<Vec<Role>> {
        let t = self.tables.read().await;
        let matches = t
            .roles
            .values()
            .filter(|r| {
                contains_ignore_case(&r.name, term)
                    || r
                        .description
                        .as_deref()
                        .is_some_and(|d| contains_ignore_case(d, term))
            })
            .cloned()
            .collect();
        Ok(sorted_by_name(matches))
    }

    async fn create_role(&self, input: &RoleInput) -> StoreResult<DbId> {
        let input = input.validated()?;
        let mut t = self.tables.write().await;
        if t.name_taken(&input.name, None) {
            return Err(duplicate_name_error().into());
        }

        let id = next_id(&mut t.next_role_id);
        let now = Utc::now();
        t.roles.insert(
            id,
            Role {
                id,
                name: input.name,
                description: input.description,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn update_role(&self, id: DbId, input: &RoleInput) -> StoreResult<()> {
        let input = input.validated()?;
        let mut t = self.tables.write().await;
        if !t.roles.contains_key(&id) {
            return Err(role_not_found(id));
        }
        if t.name_taken(&input.name, Some(id)) {
            return Err(duplicate_name_error().into());
        }

        let role = t.roles.get_mut(&id).ok_or_else(|| role_not_found(id))?;
        role.name = input.name;
        role.description = input.description;
        role.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_role(&self, id: DbId) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.roles.remove(&id).is_none() {
            return Err(role_not_found(id));
        }
        t.role_permissions.retain(|(role_id, _)| *role_id != id);
        t.user_roles.retain(|(_, role_id)| *role_id != id);
        Ok(())
    }

    async fn get_permissions_for_role(&self, role_id: DbId) -> StoreResult<Vec<String>> {
        let t = self.tables.read().await;
        Ok(t.role_permissions
            .iter()
            .filter(|(id, _)| *id == role_id)
            .map(|(_, permission)| permission.clone())
            .collect())
    }

    async fn add_permission_to_role(&self, permission: &str, role_id: DbId) -> StoreResult<()> {
        validate_permission(permission)?;
        let mut t = self.tables.write().await;
        if !t.roles.contains_key(&role_id) {
            return Err(role_not_found(role_id));
        }
        t.role_permissions.insert((role_id, permission.to_string()));
        Ok(())
    }

    async fn remove_all_permissions_from_role(&self, role_id: DbId) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .role_permissions
            .retain(|(id, _)| *id != role_id);
        Ok(())
    }

    async fn replace_permissions(&self, role_id: DbId, permissions: &[String]) -> StoreResult<()> {
        let keys = distinct_permissions(permissions)?;
        let mut t = self.tables.write().await;
        if !t.roles.contains_key(&role_id) {
            return Err(role_not_found(role_id));
        }
        t.role_permissions.retain(|(id, _)| *id != role_id);
        for key in keys {
            t.role_permissions.insert((role_id, key.to_string()));
        }
        Ok(())
    }

    async fn permissions_by_role(&self) -> StoreResult<BTreeMap<DbId, Vec<String>>> {
        let t = self.tables.read().await;
        let mut map: BTreeMap<DbId, Vec<String>> = BTreeMap::new();
        for (role_id, permission) in &t.role_permissions {
            map.entry(*role_id).or_default().push(permission.clone());
        }
        Ok(map)
    }

    async fn get_roles_for_user(&self, user_id: DbId) -> StoreResult<Vec<Role>> {
        let t = self.tables.read().await;
        let roles = t
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, role_id)| t.roles.get(role_id).cloned())
            .collect();
        Ok(sorted_by_name(roles))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: DbId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn get_groups_for_user(&self, user_id: DbId) -> StoreResult<Vec<Group>> {
        let t = self.tables.read().await;
        let mut groups: Vec<Group> = t
            .user_groups
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, group_id)| t.groups.get(group_id).cloned())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(groups)
    }
}
