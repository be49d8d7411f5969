use axum::Extension;

use crate::middleware::{ApiResponse, ApiResult, SessionContext};

/// GET /api/auth/whoami - the identity the current session resolved to
pub async fn whoami(Extension(session): Extension<SessionContext>) -> ApiResult<SessionContext> {
    Ok(ApiResponse::success(session))
}
