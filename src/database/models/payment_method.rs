use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentMethodType;

/// Saved payment credential reference. Owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub method_type: PaymentMethodType,
    pub last_four: String,
    pub expires: Option<String>,
    pub is_default: bool,
    pub billing_method_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
