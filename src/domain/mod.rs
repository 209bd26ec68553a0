//! Domain types for user provisioning.

pub mod user;

pub use user::{
    Credential, DomainError, Namespace, NewUser, RoleGrant, UserAccount, UserName,
    ADMIN_NAMESPACE,
};
