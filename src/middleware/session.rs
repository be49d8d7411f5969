use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{self, Claims};
use crate::database::Scope;
use crate::error::ApiError;
use crate::types::{Role, TenantId};

/// Identity of the caller for one request. Immutable once built.
#[derive(Clone, Debug, Serialize)]
pub struct SessionContext {
    user_id: Uuid,
    email: String,
    tenant_id: Option<TenantId>,
    role: Role,
}

impl SessionContext {
    /// Only platform administrators may act without a tenant.
    pub fn new(user_id: Uuid, email: String, tenant_id: Option<TenantId>, role: Role) -> Result<Self, ApiError> {
        if tenant_id.is_none() && role != Role::Admin {
            return Err(ApiError::forbidden("Account is not assigned to a tenant"));
        }
        Ok(Self {
            user_id,
            email,
            tenant_id,
            role,
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Query capability for this caller: its tenant, or platform-wide for
    /// a platform administrator without one.
    pub fn scope(&self) -> Scope {
        match self.tenant_id {
            Some(tenant) => Scope::tenant(tenant),
            None => Scope::platform(),
        }
    }

    /// Tenant capability, if the caller belongs to a tenant.
    pub fn tenant_scope(&self) -> Option<Scope> {
        self.tenant_id.map(Scope::tenant)
    }
}

impl TryFrom<Claims> for SessionContext {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        SessionContext::new(claims.sub, claims.email, claims.tenant_id, claims.role)
    }
}

/// Validates the bearer session token and injects a [`SessionContext`].
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;

    let claims = auth::verify_token(&token, &state.config.security.session_secret).map_err(|e| {
        tracing::debug!("Session token rejected: {}", e);
        ApiError::unauthorized("Invalid or expired session")
    })?;

    let session = SessionContext::try_from(claims)?;
    tracing::debug!(
        "Session for user {} (role {}, tenant {:?})",
        session.user_id,
        session.role.as_str(),
        session.tenant_id
    );

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer` header
fn extract_bearer(headers: &HeaderMap) -> Result<String, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty session token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
