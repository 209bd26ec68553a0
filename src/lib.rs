pub mod config;
pub mod domain;
pub mod error;
pub mod orchestration;
pub mod store;

pub use config::{Backend, Config, ConfigError};
pub use domain::{Credential, Namespace, NewUser, RoleGrant, UserAccount, UserName};
pub use error::StoreError;
pub use orchestration::{default_plan, ensure_user, EnsureOutcome, ProvisionReport, Provisioner};
pub use store::{MockUserStore, MongoUserStore, SqliteUserStore, UserStore};
