pub mod dashboard;
pub mod provisioning;

pub use dashboard::{DashboardError, DashboardService, DashboardSummary};
pub use provisioning::{PaymentSetupService, ProvisioningError, SetupOutcome};
