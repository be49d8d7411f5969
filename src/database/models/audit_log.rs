use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::TenantId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub action: String,
    pub resource: String,
    pub resource_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: Uuid,
    pub tenant_id: TenantId,
    pub action: &'static str,
    pub resource: &'static str,
    pub resource_id: Option<String>,
}
