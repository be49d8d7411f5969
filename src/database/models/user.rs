use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Role, TenantId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// `None` only for platform administrators.
    pub tenant_id: Option<TenantId>,
    pub role: Role,
    /// Payment-processor customer id. Written once, never replaced.
    pub billing_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn existing_billing_customer(&self) -> Option<&str> {
        self.billing_customer_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
    }
}
