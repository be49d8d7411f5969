pub mod stripe;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

pub use stripe::StripeClient;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Payment processor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment processor returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected payment processor response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub email: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingCustomer {
    pub id: String,
}

/// Hosted flow that collects a payment method without touching card data.
#[derive(Debug, Clone, PartialEq)]
pub struct SetupSessionRequest {
    pub customer_id: String,
    pub payment_method_types: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupSession {
    pub id: String,
    pub url: Option<String>,
}

/// The external payment processor.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Create a billing customer. Repeating the call with the same
    /// `idempotency_key` yields the same customer.
    async fn create_customer(
        &self,
        customer: &NewCustomer,
        idempotency_key: &str,
    ) -> Result<BillingCustomer, BillingError>;

    async fn create_setup_session(&self, request: &SetupSessionRequest) -> Result<SetupSession, BillingError>;
}

/// Deterministic idempotency key for creating the billing customer of a user.
pub fn customer_idempotency_key(user_id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("billing-customer:{}", user_id).as_bytes());
    let hash = hasher.finalize();
    let hash_str = format!("{:x}", hash);

    format!("customer-{}", &hash_str[..32])
}
