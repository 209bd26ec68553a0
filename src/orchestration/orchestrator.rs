use crate::config::Config;
use crate::domain::{Credential, DomainError, Namespace, RoleGrant, UserName};
use crate::orchestration::ensure::{ensure_user, EnsureOutcome, ProvisionError};
use crate::store::UserStore;
use std::sync::Arc;

/// One "check existence, create if absent" step.
#[derive(Debug, Clone)]
pub struct ProvisionStep {
    pub namespace: Namespace,
    pub name: UserName,
    pub credential: Credential,
    pub grant: RoleGrant,
}

/// The two bootstrap accounts, in order: root on the admin namespace, then
/// readWrite on the application namespace.
pub fn default_plan(config: &Config) -> Result<Vec<ProvisionStep>, DomainError> {
    Ok(vec![
        ProvisionStep {
            namespace: config.admin_db.clone(),
            name: config.user.clone(),
            credential: config.credential.clone(),
            grant: RoleGrant::new("root", config.admin_db.clone())?,
        },
        ProvisionStep {
            namespace: config.app_db.clone(),
            name: config.user.clone(),
            credential: config.credential.clone(),
            grant: RoleGrant::new("readWrite", config.app_db.clone())?,
        },
    ])
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub steps: Vec<(Namespace, UserName, EnsureOutcome)>,
}

impl ProvisionReport {
    pub fn created(&self) -> usize {
        self.count(EnsureOutcome::Created)
    }

    pub fn already_existing(&self) -> usize {
        self.count(EnsureOutcome::AlreadyExists)
    }

    fn count(&self, outcome: EnsureOutcome) -> usize {
        self.steps.iter().filter(|(_, _, o)| *o == outcome).count()
    }
}

#[derive(Clone)]
pub struct Provisioner {
    store: Arc<dyn UserStore>,
}

impl Provisioner {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Run every step in order, stopping at the first failure.
    pub async fn run(&self, plan: &[ProvisionStep]) -> Result<ProvisionReport, ProvisionError> {
        let mut report = ProvisionReport::default();

        for step in plan {
            let outcome = ensure_user(
                self.store.as_ref(),
                &step.namespace,
                &step.name,
                &step.credential,
                &step.grant,
            )
            .await?;
            report
                .steps
                .push((step.namespace.clone(), step.name.clone(), outcome));
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{MockUserStore, StoreCall};
    use std::collections::HashMap;

    fn test_config() -> Config {
        let mut env = HashMap::new();
        env.insert(
            "DATABASE_URL".to_string(),
            "mongodb://localhost:27017".to_string(),
        );
        Config::from_env_map(env).unwrap()
    }

    #[test]
    fn test_default_plan_matches_bootstrap_accounts() {
        let plan = default_plan(&test_config()).unwrap();
        assert_eq!(plan.len(), 2);

        assert_eq!(plan[0].namespace.as_str(), "admin");
        assert_eq!(plan[0].name.as_str(), "kitcha");
        assert_eq!(plan[0].grant.role, "root");
        assert_eq!(plan[0].grant.db.as_str(), "admin");

        assert_eq!(plan[1].namespace.as_str(), "board_db");
        assert_eq!(plan[1].name.as_str(), "kitcha");
        assert_eq!(plan[1].grant.role, "readWrite");
        assert_eq!(plan[1].grant.db.as_str(), "board_db");
    }

    #[tokio::test]
    async fn test_run_creates_both_users() {
        let store = Arc::new(MockUserStore::new());
        let provisioner = Provisioner::new(store.clone());

        let report = provisioner
            .run(&default_plan(&test_config()).unwrap())
            .await
            .unwrap();

        assert_eq!(report.created(), 2);
        assert_eq!(report.already_existing(), 0);
        assert_eq!(store.accounts().len(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let store = Arc::new(MockUserStore::new().offline());
        let provisioner = Provisioner::new(store.clone());

        let err = provisioner
            .run(&default_plan(&test_config()).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err.source, StoreError::Connection(_)));
        assert_eq!(err.namespace.as_str(), "admin");
        // board_db is never touched.
        assert_eq!(
            store.calls(),
            vec![StoreCall::GetUser(
                Namespace::admin(),
                UserName::new("kitcha").unwrap()
            )]
        );
    }
}
