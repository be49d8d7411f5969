use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use super::{BillingCustomer, BillingError, BillingProvider, NewCustomer, SetupSession, SetupSessionRequest};
use crate::config::BillingConfig;

/// Stripe REST client (form-encoded requests, bearer secret key).
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct ObjectId {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl StripeClient {
    pub fn new(config: &BillingConfig) -> Result<Self, BillingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    async fn post_form(
        &self,
        path: &str,
        form: &[(String, String)],
        idempotency_key: Option<&str>,
    ) -> Result<ObjectId, BillingError> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self.http.post(&url).bearer_auth(&self.secret_key).form(form);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(api_error(status, &body));
        }

        serde_json::from_str::<ObjectId>(&body).map_err(|e| BillingError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_customer(
        &self,
        customer: &NewCustomer,
        idempotency_key: &str,
    ) -> Result<BillingCustomer, BillingError> {
        let created = self
            .post_form("/v1/customers", &customer_form(customer), Some(idempotency_key))
            .await?;
        Ok(BillingCustomer { id: created.id })
    }

    async fn create_setup_session(&self, request: &SetupSessionRequest) -> Result<SetupSession, BillingError> {
        let created = self
            .post_form("/v1/checkout/sessions", &setup_session_form(request), None)
            .await?;
        Ok(SetupSession {
            id: created.id,
            url: created.url,
        })
    }
}

fn customer_form(customer: &NewCustomer) -> Vec<(String, String)> {
    let mut form = vec![("email".to_string(), customer.email.clone())];
    for (key, value) in &customer.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
}

fn setup_session_form(request: &SetupSessionRequest) -> Vec<(String, String)> {
    let mut form = vec![
        ("customer".to_string(), request.customer_id.clone()),
        ("mode".to_string(), "setup".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
    ];
    for (i, method) in request.payment_method_types.iter().enumerate() {
        form.push((format!("payment_method_types[{}]", i), method.clone()));
    }
    for (key, value) in &request.metadata {
        form.push((format!("metadata[{}]", key), value.clone()));
    }
    form
}

fn api_error(status: StatusCode, body: &str) -> BillingError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match (envelope.error.kind, envelope.error.message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind, message),
            (None, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => "unknown error".to_string(),
        },
        Err(_) => body.chars().take(200).collect(),
    };
    BillingError::Api {
        status: status.as_u16(),
        message,
    }
}
