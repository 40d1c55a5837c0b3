//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod group_repo;
pub mod role_permission_repo;
pub mod role_repo;
pub mod user_repo;

pub use group_repo::GroupRepo;
pub use role_permission_repo::RolePermissionRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
