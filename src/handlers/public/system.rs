use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

/// GET / - service identity
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "MSP Portal API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "public": ["/", "/health", "/api/config/public"],
                "protected": [
                    "/api/auth/whoami",
                    "/api/dashboard",
                    "/api/tenant",
                    "/api/products",
                    "/api/orders",
                    "/api/payments",
                    "/api/payment-methods",
                    "/api/payment-methods/setup",
                    "/api/payment-methods/:id/default",
                    "/api/audit-logs"
                ]
            }
        }
    }))
}

/// GET /health - liveness plus a data store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.gateway.health_check().await {
        Ok(()) => ApiResponse::success(json!({ "status": "ok", "database": "ok" })).into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
                .into_response()
        }
    }
}
