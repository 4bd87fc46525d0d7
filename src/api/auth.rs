use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::convert::Infallible;
use std::sync::Arc;

use super::types::{AuthRequest, TokenResponse};
use super::{ApiError, AppState};
use crate::auth::password;
use crate::services::Identity;

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth
/// Verify credentials and issue a bearer token for the account.
pub async fn post_auth(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AuthRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    // A missing credential is just a failed authentication; no field-level
    // detail that would distinguish it from a wrong password.
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::Authentication);
    };
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::Authentication);
    }

    let account = state.accounts().authenticate(&email, &password).await?;

    let token = state
        .tokens()
        .issue(account.id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(TokenResponse {
        id: account.id,
        username: account.username,
        token,
    }))
}

// ============================================================================
// Authorization gates
// ============================================================================

/// Identity resolved from basic credentials, when the header carried valid
/// ones. The gate itself never rejects; handlers decide whether an identity
/// is required.
pub struct BasicIdentity(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for BasicIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_basic(parts, state).await))
    }
}

/// Identity resolved from a bearer token; absent on any parse or signature
/// failure, never a rejection.
pub struct BearerIdentity(pub Option<Identity>);

impl FromRequestParts<Arc<AppState>> for BearerIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_bearer(parts, state)))
    }
}

async fn resolve_basic(parts: &Parts, state: &Arc<AppState>) -> Option<Identity> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;

    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;

    let (account, password_hash) = state
        .store()
        .find_account_with_password(email)
        .await
        .ok()
        .flatten()?;

    if account.inactive {
        return None;
    }

    let hash = password_hash?;
    let matches = password::verify(password, &hash).await.ok()?;
    if !matches {
        return None;
    }

    Some(Identity { id: account.id })
}

fn resolve_bearer(parts: &Parts, state: &Arc<AppState>) -> Option<Identity> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    state
        .tokens()
        .verify(token.trim())
        .ok()
        .map(|id| Identity { id })
}
