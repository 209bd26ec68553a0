//! Bootstrap provisioning: the per-user existence check and the ordered plan.

pub mod ensure;
pub mod orchestrator;

pub use ensure::{ensure_user, EnsureOutcome, ProvisionError};
pub use orchestrator::{default_plan, ProvisionReport, ProvisionStep, Provisioner};
