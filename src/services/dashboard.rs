use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::database::models::{Order, Payment, Product};
use crate::database::{DataGateway, DatabaseError, Repository, Scope, ScopedQuery, SortDirection, Table};
use crate::types::OrderStatus;

pub const RECENT_PAYMENT_LIMIT: i64 = 5;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Dashboard query failed: {0}")]
    Query(#[from] DatabaseError),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    pub active_product_count: i64,
    pub pending_order_count: i64,
    pub total_order_count: i64,
    /// Newest first.
    pub recent_payments: Vec<Payment>,
}

/// Read-only tenant summary. All four queries succeed or the whole
/// summary fails; partial numbers are never reported.
pub struct DashboardService {
    products: Repository<Product>,
    orders: Repository<Order>,
    payments: Repository<Payment>,
}

impl DashboardService {
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        Self {
            products: Repository::new(gateway.clone()),
            orders: Repository::new(gateway.clone()),
            payments: Repository::new(gateway),
        }
    }

    /// Without a tenant there is nothing to summarise, and no query is issued.
    pub async fn summarize(&self, scope: Option<&Scope>) -> Result<DashboardSummary, DashboardError> {
        let Some(scope) = scope else {
            return Ok(DashboardSummary::default());
        };

        let products = ScopedQuery::new(Table::Products, scope);
        let pending_orders = ScopedQuery::new(Table::Orders, scope)
            .eq("status", OrderStatus::Pending.as_str())
            .map_err(DatabaseError::from)?;
        let all_orders = ScopedQuery::new(Table::Orders, scope);
        let recent_payments = ScopedQuery::new(Table::Payments, scope)
            .order_by("created_at", SortDirection::Desc)
            .and_then(|q| q.order_by("id", SortDirection::Desc))
            .and_then(|q| q.limit(RECENT_PAYMENT_LIMIT))
            .map_err(DatabaseError::from)?;

        let (active_product_count, pending_order_count, total_order_count, recent_payments) = futures::try_join!(
            self.products.count(&products),
            self.orders.count(&pending_orders),
            self.orders.count(&all_orders),
            self.payments.select_any(&recent_payments),
        )?;

        Ok(DashboardSummary {
            active_product_count,
            pending_order_count,
            total_order_count,
            recent_payments,
        })
    }
}
