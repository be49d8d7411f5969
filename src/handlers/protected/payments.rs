use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::Payment;
use crate::database::{Repository, ScopedQuery, SortDirection, Table};
use crate::middleware::{ApiResponse, ApiResult, SessionContext};

const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct PaymentsQuery {
    pub limit: Option<i64>,
}

/// GET /api/payments?limit= - the tenant's payment history, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<PaymentsQuery>,
) -> ApiResult<Vec<Payment>> {
    let Some(scope) = session.tenant_scope() else {
        return Ok(ApiResponse::success(vec![]));
    };

    let query = ScopedQuery::new(Table::Payments, &scope)
        .order_by("created_at", SortDirection::Desc)?
        .order_by("id", SortDirection::Desc)?
        .limit(params.limit.unwrap_or(DEFAULT_LIMIT))?;

    let payments = Repository::<Payment>::new(state.gateway.clone()).select_any(&query).await?;
    Ok(ApiResponse::success(payments))
}
