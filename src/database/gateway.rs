use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::NewAuditLog;
use crate::database::query_builder::{Scope, ScopedQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedCustomer {
    pub customer_id: String,
    /// False when another writer got there first.
    pub written: bool,
}

/// The single handle every route and workflow uses to reach tenant data.
///
/// Reads only accept a [`ScopedQuery`], so an unscoped read cannot be
/// expressed. Writes take the scope (or the owning user) explicitly.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Rows as JSON objects, decoded by the caller.
    async fn fetch(&self, query: &ScopedQuery) -> Result<Vec<Value>, DatabaseError>;

    async fn count(&self, query: &ScopedQuery) -> Result<i64, DatabaseError>;

    /// Compare-and-set of `users.billing_customer_id`.
    ///
    /// Writes `customer_id` only if the user visible in `scope` has none yet.
    /// Reports the id persisted afterwards, which is the first one ever
    /// written. `NotFound` when the user is not visible in `scope`.
    async fn attach_billing_customer(
        &self,
        scope: &Scope,
        user_id: Uuid,
        customer_id: &str,
    ) -> Result<AttachedCustomer, DatabaseError>;

    /// Make `method_id` the only default method of `user_id`.
    /// Returns `false` (and changes nothing) when the method is not theirs.
    async fn set_default_payment_method(&self, user_id: Uuid, method_id: Uuid) -> Result<bool, DatabaseError>;

    async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<(), DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
