use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::billing::{customer_idempotency_key, BillingError, BillingProvider, NewCustomer, SetupSessionRequest};
use crate::database::models::{NewAuditLog, User};
use crate::database::{DataGateway, DatabaseError, Repository, Scope, ScopedQuery, Table};
use crate::middleware::SessionContext;
use crate::types::Role;

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("User ID is required")]
    MissingUserId,

    #[error("Not allowed to set up payment methods for another user")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Data store failure: {0}")]
    Database(#[from] DatabaseError),

    #[error("Payment processor failure: {0}")]
    Billing(#[from] BillingError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupOutcome {
    pub session_id: String,
    pub customer_id: String,
    /// True when this call persisted the billing customer id.
    pub customer_created: bool,
}

/// Ensures a user has a billing customer, then opens a hosted session that
/// collects a card for that customer.
///
/// Steps run strictly in order: lookup, conditional customer creation,
/// session creation. The workflow is re-entrant: if session creation fails
/// after the customer id was persisted, a retry reuses that id.
pub struct PaymentSetupService {
    gateway: Arc<dyn DataGateway>,
    billing: Arc<dyn BillingProvider>,
    users: Repository<User>,
}

impl PaymentSetupService {
    pub fn new(gateway: Arc<dyn DataGateway>, billing: Arc<dyn BillingProvider>) -> Self {
        Self {
            users: Repository::new(gateway.clone()),
            gateway,
            billing,
        }
    }

    pub async fn start_setup(
        &self,
        session: &SessionContext,
        user_id: &str,
        origin: &str,
    ) -> Result<SetupOutcome, ProvisioningError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(ProvisioningError::MissingUserId);
        }

        // Ids are uuids; anything else cannot name a user.
        let parsed = Uuid::parse_str(user_id).ok();
        if session.role() == Role::User && parsed != Some(session.user_id()) {
            return Err(ProvisioningError::Forbidden);
        }
        let user_id = parsed.ok_or(ProvisioningError::UserNotFound)?;

        let scope = session.scope();
        let query = ScopedQuery::new(Table::Users, &scope)
            .eq("id", user_id)
            .map_err(DatabaseError::from)?;
        let user = self
            .users
            .select_one(&query)
            .await?
            .ok_or(ProvisioningError::UserNotFound)?;

        let (customer_id, customer_created) = self.ensure_billing_customer(&scope, &user).await?;

        let request = setup_session_request(&customer_id, user.id, origin);
        let hosted = self.billing.create_setup_session(&request).await?;
        info!(
            "Opened payment setup session {} for user {} (customer {})",
            hosted.id, user.id, customer_id
        );

        Ok(SetupOutcome {
            session_id: hosted.id,
            customer_id,
            customer_created,
        })
    }

    async fn ensure_billing_customer(&self, scope: &Scope, user: &User) -> Result<(String, bool), ProvisioningError> {
        if let Some(existing) = user.existing_billing_customer() {
            debug!("User {} already has billing customer {}", user.id, existing);
            return Ok((existing.to_string(), false));
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("userId".to_string(), user.id.to_string());
        metadata.insert(
            "tenantId".to_string(),
            user.tenant_id.map(|t| t.to_string()).unwrap_or_default(),
        );
        let customer = NewCustomer {
            email: user.email.clone(),
            metadata,
        };

        let created = self
            .billing
            .create_customer(&customer, &customer_idempotency_key(user.id))
            .await?;

        let attached = match self.gateway.attach_billing_customer(scope, user.id, &created.id).await {
            Ok(attached) => attached,
            Err(DatabaseError::NotFound(_)) => return Err(ProvisioningError::UserNotFound),
            Err(e) => return Err(e.into()),
        };

        if !attached.written {
            if attached.customer_id != created.id {
                warn!(
                    "Billing customer {} for user {} lost to {}; it is orphaned and needs reconciliation",
                    created.id, user.id, attached.customer_id
                );
            }
            return Ok((attached.customer_id, false));
        }

        info!("Created billing customer {} for user {}", attached.customer_id, user.id);
        self.record_customer_created(user, &attached.customer_id).await;
        Ok((attached.customer_id, true))
    }

    async fn record_customer_created(&self, user: &User, customer_id: &str) {
        let Some(tenant_id) = user.tenant_id else {
            return;
        };
        let entry = NewAuditLog {
            user_id: user.id,
            tenant_id,
            action: "billing_customer.created",
            resource: "users",
            resource_id: Some(customer_id.to_string()),
        };
        if let Err(e) = self.gateway.insert_audit_log(&entry).await {
            warn!("Failed to audit billing customer creation for user {}: {}", user.id, e);
        }
    }
}

fn setup_session_request(customer_id: &str, user_id: Uuid, origin: &str) -> SetupSessionRequest {
    let origin = origin.trim_end_matches('/');
    SetupSessionRequest {
        customer_id: customer_id.to_string(),
        payment_method_types: vec!["card".to_string()],
        success_url: format!("{}/payments?success=true", origin),
        cancel_url: format!("{}/payments?canceled=true", origin),
        metadata: BTreeMap::from([("userId".to_string(), user_id.to_string())]),
    }
}
