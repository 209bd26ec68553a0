//! In-memory user store for testing without a database.

use super::UserStore;
use crate::domain::{Namespace, NewUser, UserAccount, UserName};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    GetUser(Namespace, UserName),
    CreateUser(Namespace, UserName),
}

/// Mock user store with optional failure injection.
#[derive(Debug, Default)]
pub struct MockUserStore {
    users: Mutex<BTreeMap<(Namespace, UserName), UserAccount>>,
    calls: Mutex<Vec<StoreCall>>,
    offline: bool,
    read_only: HashSet<Namespace>,
    unavailable: HashSet<Namespace>,
    hide_on_lookup: HashSet<Namespace>,
}

impl MockUserStore {
    /// Create an empty, healthy mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing account.
    pub fn with_user(self, account: UserAccount) -> Self {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert((account.namespace.clone(), account.name.clone()), account);
        self
    }

    /// Fail every call with a connection error.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Reject user creation in `namespace` with a permission error.
    pub fn read_only(mut self, namespace: Namespace) -> Self {
        self.read_only.insert(namespace);
        self
    }

    /// Fail every call against `namespace`.
    pub fn unavailable(mut self, namespace: Namespace) -> Self {
        self.unavailable.insert(namespace);
        self
    }

    /// Report users in `namespace` as absent on lookup while still rejecting
    /// duplicate creates, simulating a concurrent writer.
    pub fn stale_lookups(mut self, namespace: Namespace) -> Self {
        self.hide_on_lookup.insert(namespace);
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// All accounts currently stored.
    pub fn accounts(&self) -> Vec<UserAccount> {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_reachable(&self, namespace: &Namespace) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::Connection("mock store is offline".to_string()));
        }
        if self.unavailable.contains(namespace) {
            return Err(StoreError::NamespaceUnavailable(namespace.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MockUserStore {
    async fn get_user(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<Option<UserAccount>, StoreError> {
        self.record(StoreCall::GetUser(namespace.clone(), name.clone()));
        self.check_reachable(namespace)?;

        if self.hide_on_lookup.contains(namespace) {
            return Ok(None);
        }

        Ok(self
            .users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(namespace.clone(), name.clone()))
            .cloned())
    }

    async fn create_user(&self, namespace: &Namespace, user: &NewUser) -> Result<(), StoreError> {
        self.record(StoreCall::CreateUser(namespace.clone(), user.name.clone()));
        self.check_reachable(namespace)?;

        if self.read_only.contains(namespace) {
            return Err(StoreError::PermissionDenied(format!(
                "not authorized on {} to execute command createUser",
                namespace
            )));
        }

        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        let key = (namespace.clone(), user.name.clone());
        if users.contains_key(&key) {
            return Err(StoreError::UserExists(format!("{}@{}", user.name, namespace)));
        }
        users.insert(
            key,
            UserAccount {
                namespace: namespace.clone(),
                name: user.name.clone(),
                roles: user.roles.clone(),
            },
        );
        Ok(())
    }

    async fn count_users(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<usize, StoreError> {
        self.check_reachable(namespace)?;
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(usize::from(users.contains_key(&(namespace.clone(), name.clone()))))
    }
}
