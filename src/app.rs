use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::billing::BillingProvider;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::DataGateway;
use crate::handlers::{protected, public};
use crate::middleware::session_middleware;
use crate::services::{DashboardService, PaymentSetupService};

/// Shared per-process dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gateway: Arc<dyn DataGateway>,
    pub payment_setup: Arc<PaymentSetupService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: Arc<dyn DataGateway>, billing: Arc<dyn BillingProvider>) -> Self {
        Self {
            payment_setup: Arc::new(PaymentSetupService::new(gateway.clone(), billing)),
            dashboard: Arc::new(DashboardService::new(gateway.clone())),
            config: Arc::new(config),
            gateway,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .route("/api/config/public", get(public::config::public_config))
        // Protected
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use protected::{audit, auth, catalog, dashboard, payment_methods, payments};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/tenant", get(catalog::tenant))
        .route("/api/products", get(catalog::products))
        .route("/api/orders", get(catalog::orders))
        .route("/api/payments", get(payments::list))
        .route("/api/payment-methods", get(payment_methods::list))
        .route("/api/payment-methods/setup", post(payment_methods::setup))
        .route("/api/payment-methods/:id/default", put(payment_methods::make_default))
        .route("/api/audit-logs", get(audit::list))
        .route_layer(middleware::from_fn_with_state(state, session_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
}
