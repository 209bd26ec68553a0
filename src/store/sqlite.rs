//! SQLite-backed user store.

use super::UserStore;
use crate::domain::{Credential, Namespace, NewUser, RoleGrant, UserAccount, UserName};
use crate::error::StoreError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Open (creating if needed) the SQLite database and apply the schema.
pub async fn init_db(db_path: &str, acquire_timeout: Duration) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(acquire_timeout)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!("User store initialized at {}", db_path);
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = FULL")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Salted SHA-256 of the secret, hex-encoded.
fn hash_credential(salt: &str, credential: &Credential) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(credential.expose().as_bytes());
    hex::encode(hasher.finalize())
}

/// User store keeping accounts in a local SQLite `users` table.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteUserStore { pool }
    }

    /// Open the database at `path` and wrap it in a store.
    pub async fn connect(path: &str, timeout: Duration) -> Result<Self, StoreError> {
        let pool = init_db(path, timeout).await?;
        Ok(Self::new(pool))
    }

    /// Check `credential` against the stored hash for a user.
    ///
    /// Returns `false` when the user does not exist.
    pub async fn verify_credential(
        &self,
        namespace: &Namespace,
        name: &UserName,
        credential: &Credential,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT credential_salt, credential_hash FROM users WHERE namespace = ? AND name = ?",
        )
        .bind(namespace.as_str())
        .bind(name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => {
                let salt: String = row.try_get("credential_salt")?;
                let stored: String = row.try_get("credential_hash")?;
                hash_credential(&salt, credential) == stored
            }
            None => false,
        })
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn get_user(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query("SELECT roles FROM users WHERE namespace = ? AND name = ?")
            .bind(namespace.as_str())
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let roles_json: String = row.try_get("roles")?;
        let roles: Vec<RoleGrant> = serde_json::from_str(&roles_json)?;

        Ok(Some(UserAccount {
            namespace: namespace.clone(),
            name: name.clone(),
            roles,
        }))
    }

    async fn create_user(&self, namespace: &Namespace, user: &NewUser) -> Result<(), StoreError> {
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let credential_hash = hash_credential(&salt, &user.credential);
        let roles = serde_json::to_string(&user.roles)?;

        sqlx::query(
            r#"
            INSERT INTO users (namespace, name, credential_salt, credential_hash, roles, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(namespace.as_str())
        .bind(user.name.as_str())
        .bind(&salt)
        .bind(&credential_hash)
        .bind(&roles)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(namespace = %namespace, user = %user.name, "inserted user row");
        Ok(())
    }

    async fn count_users(
        &self,
        namespace: &Namespace,
        name: &UserName,
    ) -> Result<usize, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE namespace = ? AND name = ?")
                .bind(namespace.as_str())
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count as usize)
    }
}
