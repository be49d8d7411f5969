use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::AuditLog;
use crate::database::{Repository, ScopedQuery, SortDirection, Table};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionContext};

const AUDIT_PAGE: i64 = 100;

/// GET /api/audit-logs - recent audit trail of the tenant (administrators only)
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Vec<AuditLog>> {
    if !session.role().is_administrative() {
        return Err(ApiError::forbidden("Administrative role required"));
    }
    let Some(scope) = session.tenant_scope() else {
        return Ok(ApiResponse::success(vec![]));
    };

    let query = ScopedQuery::new(Table::AuditLogs, &scope)
        .order_by("created_at", SortDirection::Desc)?
        .limit(AUDIT_PAGE)?;

    let entries = Repository::<AuditLog>::new(state.gateway.clone()).select_any(&query).await?;
    Ok(ApiResponse::success(entries))
}
