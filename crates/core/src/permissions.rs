//! The static permission catalog.
//!
//! These keys must match the seed data in `20260101000002_create_permissions_table.sql`.
//! Permissions are never created or deleted at runtime; roles only link to them.

use serde::Serialize;

use crate::error::CoreError;
use crate::validation::FieldErrors;

pub const PERM_MANAGE_ROLES: &str = "manage_roles";
pub const PERM_MANAGE_USERS: &str = "manage_users";
pub const PERM_MANAGE_GROUPS: &str = "manage_groups";
pub const PERM_VIEW_REPORTS: &str = "view_reports";
pub const PERM_EDIT_POSTS: &str = "edit_posts";
pub const PERM_PUBLISH_POSTS: &str = "publish_posts";
pub const PERM_DELETE_POSTS: &str = "delete_posts";
pub const PERM_MODERATE_COMMENTS: &str = "moderate_comments";

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub key: &'static str,
    pub description: &'static str,
}

/// Every permission the system recognizes, ordered by key.
pub const CATALOG: &[Permission] = &[
    Permission {
        key: PERM_DELETE_POSTS,
        description: "Delete posts",
    },
    Permission {
        key: PERM_EDIT_POSTS,
        description: "Edit existing posts",
    },
    Permission {
        key: PERM_MANAGE_GROUPS,
        description: "Create, edit and delete groups",
    },
    Permission {
        key: PERM_MANAGE_ROLES,
        description: "Create, edit and delete roles",
    },
    Permission {
        key: PERM_MANAGE_USERS,
        description: "Create, edit and deactivate users",
    },
    Permission {
        key: PERM_MODERATE_COMMENTS,
        description: "Approve and remove comments",
    },
    Permission {
        key: PERM_PUBLISH_POSTS,
        description: "Publish posts",
    },
    Permission {
        key: PERM_VIEW_REPORTS,
        description: "Read reporting dashboards",
    },
];

/// Form field that carries the selected permission checkboxes.
pub const SELECTED_PERMISSIONS_FIELD: &str = "sel_permissions";

/// Look up a catalog entry by key.
pub fn find(key: &str) -> Option<&'static Permission> {
    CATALOG.iter().find(|p| p.key == key)
}

pub fn is_known(key: &str) -> bool {
    find(key).is_some()
}

/// Message shown when a submitted key is not part of the catalog.
pub fn unknown_permission_message(key: &str) -> String {
    format!("The permission \"{key}\" is not recognized.")
}

/// Validate that `key` is part of the catalog.
pub fn validate_permission(key: &str) -> Result<(), CoreError> {
    if is_known(key) {
        Ok(())
    } else {
        Err(CoreError::InvalidFields(FieldErrors::single(
            SELECTED_PERMISSIONS_FIELD,
            unknown_permission_message(key),
        )))
    }
}
