//! MongoDB user store using the `usersInfo` and `createUser` commands.

use super::UserStore;
use crate::domain::{Namespace, NewUser, RoleGrant, UserAccount, UserName};
use crate::error::StoreError;
use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

// Server error codes, see mongo/base/error_codes.yml.
const CODE_UNAUTHORIZED: i32 = 13;
const CODE_AUTHENTICATION_FAILED: i32 = 18;
const CODE_INVALID_NAMESPACE: i32 = 73;
const CODE_DUPLICATE_KEY: i32 = 11000;
const CODE_USER_ALREADY_EXISTS: i32 = 51003;

const APP_NAME: &str = "board-bootstrap";

#[derive(Debug, Deserialize)]
struct UsersInfoReply {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    roles: Vec<RoleGrant>,
}

/// User store backed by a live MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoUserStore {
    client: Client,
}

impl MongoUserStore {
    pub fn new(client: Client) -> Self {
        MongoUserStore { client }
    }

    /// Connect to `uri` and confirm the deployment answers a ping.
    pub async fn connect(uri: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options).map_err(classify_error)?;
        client
            .database(crate::domain::ADMIN_NAMESPACE)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(classify_error)?;

        info!("Connected to MongoDB");
        Ok(Self::new(client))
    }

    async fn users_info(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<Vec<UserInfo>, StoreError> {
        let reply = self
            .client
            .database(namespace.as_str())
            .run_command(doc! { "usersInfo": name.as_str() })
            .await
            .map_err(classify_error)?;

        let parsed: UsersInfoReply = mongodb::bson::from_document(reply)
            .map_err(|e| StoreError::Backend(format!("malformed usersInfo reply: {}", e)))?;
        Ok(parsed.users)
    }
}

fn create_user_command(user: &NewUser) -> Document {
    let roles: Vec<Document> = user
        .roles
        .iter()
        .map(|grant| doc! { "role": grant.role.as_str(), "db": grant.db.as_str() })
        .collect();

    doc! {
        "createUser": user.name.as_str(),
        "pwd": user.credential.expose(),
        "roles": roles,
    }
}

/// Map a server command error code onto the store taxonomy.
fn classify_command_error(code: i32, message: String) -> StoreError {
    match code {
        CODE_UNAUTHORIZED | CODE_AUTHENTICATION_FAILED => StoreError::PermissionDenied(message),
        CODE_INVALID_NAMESPACE => StoreError::NamespaceUnavailable(message),
        CODE_DUPLICATE_KEY | CODE_USER_ALREADY_EXISTS => StoreError::UserExists(message),
        _ => StoreError::Backend(format!("code {}: {}", code, message)),
    }
}

fn classify_error(err: MongoError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::Command(cmd) => classify_command_error(cmd.code, cmd.message.clone()),
        ErrorKind::Authentication { .. } => StoreError::PermissionDenied(err.to_string()),
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Connection(err.to_string()),
        _ => StoreError::Backend(err.to_string()),
    }
}

impl From<MongoError> for StoreError {
    fn from(err: MongoError) -> Self {
        classify_error(err)
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn get_user(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<Option<UserAccount>, StoreError> {
        let users = self.users_info(namespace, name).await?;
        Ok(users.into_iter().next().map(|info| UserAccount {
            namespace: namespace.clone(),
            name: name.clone(),
            roles: info.roles,
        }))
    }

    async fn create_user(&self, namespace: &Namespace, user: &NewUser) -> Result<(), StoreError> {
        self.client
            .database(namespace.as_str())
            .run_command(create_user_command(user))
            .await
            .map_err(classify_error)?;

        debug!(namespace = %namespace, user = %user.name, "createUser acknowledged");
        Ok(())
    }

    async fn count_users(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<usize, StoreError> {
        Ok(self.users_info(namespace, name).await?.len())
    }
}
