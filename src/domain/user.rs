//! User account types: namespaces, names, credentials, and role grants.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name of the administrative namespace.
pub const ADMIN_NAMESPACE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

fn non_empty(value: String, field: &'static str) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::Empty(field))
    } else {
        Ok(value)
    }
}

/// Logical database grouping users, roles, and data (e.g. "admin", "board_db").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        non_empty(name.into(), "namespace").map(Namespace)
    }

    /// The administrative namespace.
    pub fn admin() -> Self {
        Namespace(ADMIN_NAMESPACE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Namespace {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Namespace::new(value)
    }
}

impl From<Namespace> for String {
    fn from(ns: Namespace) -> Self {
        ns.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier, unique within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        non_empty(name.into(), "user name").map(UserName)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserName::new(value)
    }
}

impl From<UserName> for String {
    fn from(name: UserName) -> Self {
        name.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secret material for a user. Never shown by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Result<Self, DomainError> {
        let secret = secret.into();
        // Whitespace is a legal password character; only reject the empty string.
        if secret.is_empty() {
            return Err(DomainError::Empty("credential"));
        }
        Ok(Credential(secret))
    }

    /// Expose the raw secret. Only store backends should call this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// A (role, namespace) pair granting scoped privileges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRoleGrant")]
pub struct RoleGrant {
    pub role: String,
    pub db: Namespace,
}

#[derive(Deserialize)]
struct RawRoleGrant {
    role: String,
    db: Namespace,
}

impl TryFrom<RawRoleGrant> for RoleGrant {
    type Error = DomainError;

    fn try_from(raw: RawRoleGrant) -> Result<Self, Self::Error> {
        RoleGrant::new(raw.role, raw.db)
    }
}

impl RoleGrant {
    pub fn new(role: impl Into<String>, db: Namespace) -> Result<Self, DomainError> {
        Ok(RoleGrant {
            role: non_empty(role.into(), "role")?,
            db,
        })
    }
}

impl fmt::Display for RoleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.role, self.db)
    }
}

/// A user as reported by an existence lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub namespace: Namespace,
    pub name: UserName,
    pub roles: Vec<RoleGrant>,
}

impl UserAccount {
    pub fn has_role(&self, role: &str, db: &Namespace) -> bool {
        self.roles.iter().any(|g| g.role == role && &g.db == db)
    }
}

/// A user to be created.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: UserName,
    pub credential: Credential,
    pub roles: Vec<RoleGrant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_rejected() {
        assert_eq!(Namespace::new(""), Err(DomainError::Empty("namespace")));
        assert_eq!(Namespace::new("  "), Err(DomainError::Empty("namespace")));
        assert_eq!(UserName::new(""), Err(DomainError::Empty("user name")));
        assert_eq!(
            RoleGrant::new("", Namespace::admin()),
            Err(DomainError::Empty("role"))
        );
        assert!(Credential::new("").is_err());
    }

    #[test]
    fn test_credential_is_redacted() {
        let cred = Credential::new("hunter2").unwrap();
        assert_eq!(format!("{:?}", cred), "Credential(***)");
        assert_eq!(cred.to_string(), "***");
        assert_eq!(cred.expose(), "hunter2");
    }

    #[test]
    fn test_role_grant_json_shape() {
        let grant = RoleGrant::new("readWrite", Namespace::new("board_db").unwrap()).unwrap();
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json, serde_json::json!({"role": "readWrite", "db": "board_db"}));

        let back: RoleGrant = serde_json::from_value(json).unwrap();
        assert_eq!(back, grant);
    }

    #[test]
    fn test_role_grant_rejects_empty_db_on_deserialize() {
        let result: Result<RoleGrant, _> =
            serde_json::from_value(serde_json::json!({"role": "root", "db": ""}));
        assert!(result.is_err());
    }

    #[test]
    fn test_role_grant_rejects_empty_role_on_deserialize() {
        let result: Result<RoleGrant, _> =
            serde_json::from_value(serde_json::json!({"role": "", "db": "admin"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_name_serde() {
        let name: UserName = serde_json::from_value(serde_json::json!("kitcha")).unwrap();
        assert_eq!(name.as_str(), "kitcha");
        assert_eq!(serde_json::to_value(&name).unwrap(), serde_json::json!("kitcha"));

        let empty: Result<UserName, _> = serde_json::from_value(serde_json::json!(""));
        assert!(empty.is_err());
    }

    #[test]
    fn test_has_role() {
        let admin = Namespace::admin();
        let account = UserAccount {
            namespace: admin.clone(),
            name: UserName::new("kitcha").unwrap(),
            roles: vec![RoleGrant::new("root", admin.clone()).unwrap()],
        };
        assert!(account.has_role("root", &admin));
        assert!(!account.has_role("readWrite", &admin));
    }
}
