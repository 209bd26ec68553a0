//! User store abstraction over a database's authentication subsystem.

use crate::config::{Backend, Config};
use crate::domain::{Namespace, NewUser, UserAccount, UserName};
use crate::error::StoreError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub mod mock;
pub mod mongo;
pub mod sqlite;

pub use mock::{MockUserStore, StoreCall};
pub use mongo::MongoUserStore;
pub use sqlite::{init_db, SqliteUserStore};

/// Access to user accounts, scoped per namespace.
///
/// Every call names its target namespace explicitly; implementations hold no
/// "current database" state.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Look up a user by name within `namespace`.
    ///
    /// Returns `None` when no such user exists.
    async fn get_user(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<Option<UserAccount>, StoreError>;

    /// Create a user in `namespace`.
    ///
    /// Returns `StoreError::UserExists` if the name is already taken.
    async fn create_user(&self, namespace: &Namespace, user: &NewUser) -> Result<(), StoreError>;

    /// Number of accounts named `name` in `namespace` (0 or 1 for a healthy store).
    async fn count_users(&self, namespace: &Namespace, name: &UserName)
        -> Result<usize, StoreError>;
}

/// Connect to the backend selected by the configured database URL.
pub async fn connect(config: &Config) -> Result<Arc<dyn UserStore>, StoreError> {
    let timeout = Duration::from_millis(config.connect_timeout_ms);
    match &config.backend {
        Backend::Mongo => {
            let store = MongoUserStore::connect(&config.database_url, timeout).await?;
            Ok(Arc::new(store))
        }
        Backend::Sqlite { path } => {
            let store = SqliteUserStore::connect(path, timeout).await?;
            Ok(Arc::new(store))
        }
    }
}
