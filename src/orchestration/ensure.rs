use crate::domain::{Credential, Namespace, NewUser, RoleGrant, UserName};
use crate::error::StoreError;
use crate::store::UserStore;
use thiserror::Error;
use tracing::{info, warn};

/// Result of a single `ensure_user` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Error)]
#[error("failed to provision user {user} in namespace {namespace}: {source}")]
pub struct ProvisionError {
    pub namespace: Namespace,
    pub user: UserName,
    #[source]
    pub source: StoreError,
}

/// Ensure `name` exists in `namespace`, creating it with `credential` and the
/// single `grant` when absent.
///
/// An existing user is left untouched, whatever roles it holds. Store errors
/// are returned as-is with no retry; the caller's restart policy is the retry.
pub async fn ensure_user(
    store: &dyn UserStore,
    namespace: &Namespace,
    name: &UserName,
    credential: &Credential,
    grant: &RoleGrant,
) -> Result<EnsureOutcome, ProvisionError> {
    let wrap = |source: StoreError| ProvisionError {
        namespace: namespace.clone(),
        user: name.clone(),
        source,
    };

    if let Some(existing) = store.get_user(namespace, name).await.map_err(wrap)? {
        if !existing.roles.contains(grant) {
            warn!(
                namespace = %namespace,
                user = %name,
                expected = %grant,
                "user exists without the expected role; leaving it unchanged"
            );
        }
        info!(namespace = %namespace, user = %name, "user already exists");
        return Ok(EnsureOutcome::AlreadyExists);
    }

    let new_user = NewUser {
        name: name.clone(),
        credential: credential.clone(),
        roles: vec![grant.clone()],
    };

    match store.create_user(namespace, &new_user).await {
        Ok(()) => {
            info!(namespace = %namespace, user = %name, role = %grant, "created user");
            Ok(EnsureOutcome::Created)
        }
        // Lost a race with another writer between lookup and create.
        Err(StoreError::UserExists(_)) => {
            info!(namespace = %namespace, user = %name, "user created concurrently");
            Ok(EnsureOutcome::AlreadyExists)
        }
        Err(e) => Err(wrap(e)),
    }
}
