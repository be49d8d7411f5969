use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{Order, Product, Tenant};
use crate::database::{Repository, ScopedQuery, SortDirection, Table};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionContext};
use crate::types::OrderStatus;

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// GET /api/tenant - branding and identity of the caller's tenant
pub async fn tenant(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Tenant> {
    let scope = session
        .tenant_scope()
        .ok_or_else(|| ApiError::not_found("Account is not assigned to a tenant"))?;

    let query = ScopedQuery::new(Table::Tenants, &scope);
    let tenant = Repository::<Tenant>::new(state.gateway.clone())
        .select_one(&query)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

    Ok(ApiResponse::success(tenant))
}

/// GET /api/products - the tenant's catalogue, newest first
pub async fn products(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Vec<Product>> {
    let Some(scope) = session.tenant_scope() else {
        return Ok(ApiResponse::success(vec![]));
    };

    let query = ScopedQuery::new(Table::Products, &scope).order_by("created_at", SortDirection::Desc)?;
    let products = Repository::<Product>::new(state.gateway.clone()).select_any(&query).await?;
    Ok(ApiResponse::success(products))
}

/// GET /api/orders?status= - the tenant's orders, newest first
pub async fn orders(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Query(params): Query<OrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(ApiError::bad_request)?;

    let Some(scope) = session.tenant_scope() else {
        return Ok(ApiResponse::success(vec![]));
    };

    let mut query = ScopedQuery::new(Table::Orders, &scope).order_by("created_at", SortDirection::Desc)?;
    if let Some(status) = status {
        query = query.eq("status", status.as_str())?;
    }

    let orders = Repository::<Order>::new(state.gateway.clone()).select_any(&query).await?;
    Ok(ApiResponse::success(orders))
}
