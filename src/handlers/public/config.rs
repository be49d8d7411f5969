use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// Keys a browser client needs. Secret keys never leave the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub payment_publishable_key: String,
    pub data_store_public_key: String,
}

/// GET /api/config/public
pub async fn public_config(State(state): State<AppState>) -> ApiResult<PublicConfig> {
    Ok(ApiResponse::success(PublicConfig {
        payment_publishable_key: state.config.billing.publishable_key.clone(),
        data_store_public_key: state.config.database.public_key.clone(),
    }))
}
