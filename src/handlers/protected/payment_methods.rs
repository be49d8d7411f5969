use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::PaymentMethod;
use crate::database::{Repository, ScopedQuery, SortDirection, Table};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, SessionContext};

#[derive(Debug, Default, Deserialize)]
pub struct SetupRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<Value>,
}

impl SetupRequest {
    /// Parse a request body. An empty body is a request without a user id;
    /// only malformed JSON is rejected here.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::invalid_json(format!("Invalid JSON body: {}", e)))
    }

    /// The user id when it is a string; any other JSON value counts as absent.
    pub fn user_id(&self) -> &str {
        match &self.user_id {
            Some(Value::String(id)) => id,
            _ => "",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SetupResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct DefaultMethod {
    pub id: Uuid,
    pub is_default: bool,
}

/// POST /api/payment-methods/setup - open a hosted card collection session
///
/// Input: `{ "userId": "<uuid>" }`. Output: `{ "sessionId": "..." }`.
/// The return URLs are built from the request `Origin` when it is a
/// configured CORS origin, else from the configured application URL.
pub async fn setup(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SetupResponse>, ApiError> {
    let request = SetupRequest::from_body(&body)?;

    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let origin = state.config.redirect_origin(origin);

    let outcome = state.payment_setup.start_setup(&session, request.user_id(), origin).await?;
    Ok(Json(SetupResponse {
        session_id: outcome.session_id,
    }))
}

/// GET /api/payment-methods - the caller's saved methods, default first
pub async fn list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
) -> ApiResult<Vec<PaymentMethod>> {
    let Some(scope) = session.tenant_scope() else {
        return Ok(ApiResponse::success(vec![]));
    };

    let query = ScopedQuery::new(Table::PaymentMethods, &scope)
        .eq("user_id", session.user_id())?
        .order_by("is_default", SortDirection::Desc)?
        .order_by("created_at", SortDirection::Desc)?;

    let methods = Repository::<PaymentMethod>::new(state.gateway.clone())
        .select_any(&query)
        .await?;
    Ok(ApiResponse::success(methods))
}

/// PUT /api/payment-methods/:id/default - make one of the caller's methods the default
pub async fn make_default(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ApiResult<DefaultMethod> {
    let not_found = || ApiError::not_found("Payment method not found");
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    if !state.gateway.set_default_payment_method(session.user_id(), id).await? {
        return Err(not_found());
    }
    tracing::info!("User {} set default payment method {}", session.user_id(), id);
    Ok(ApiResponse::success(DefaultMethod { id, is_default: true }))
}
