use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, SessionContext};
use crate::services::DashboardSummary;

/// GET /api/dashboard - tenant summary
///
/// Accounts without a tenant get an all-zero summary. Any failing query
/// fails the whole response with 500.
pub async fn summary(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<DashboardSummary> {
    let summary = state.dashboard.summarize(session.tenant_scope().as_ref()).await?;
    Ok(ApiResponse::success(summary))
}
