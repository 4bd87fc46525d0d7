use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::{BasicIdentity, BearerIdentity};
use super::pagination::Pagination;
use super::types::{MessageResponse, PageResponse, RegisterRequest, UpdateRequest, UserView};
use super::{ApiError, AppState, validation};
use crate::locale::{self, Lang, keys};
use crate::services::{ProfilePatch, Registration};

/// POST /users
/// Register a new account; the response is a generic localized success
/// message either way, details arrive by mail.
pub async fn post_user(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let errors = validation::validate_registration(state.store(), &payload).await?;
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Validation guarantees username and email are present past this point.
    let registration = Registration {
        username: payload.username.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        password: payload.password,
    };

    state.accounts().register(registration).await?;

    Ok(Json(MessageResponse {
        message: locale::translate(lang, keys::USER_SUCCESS),
    }))
}

/// POST /users/token/{token}
/// Consume an activation token.
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    lang: Lang,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.accounts().activate(&token).await?;

    Ok(Json(MessageResponse {
        message: locale::translate(lang, keys::ACCOUNT_ACTIVATION_SUCCESS),
    }))
}

/// GET /users
/// Page through active accounts; an authenticated caller never sees their
/// own row.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    pagination: Pagination,
    BasicIdentity(identity): BasicIdentity,
) -> Result<Json<PageResponse>, ApiError> {
    let page = state
        .accounts()
        .list_accounts(pagination.page, pagination.size, identity)
        .await?;

    Ok(Json(PageResponse::from(page)))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<UserView>, ApiError> {
    let account = state.accounts().get_account(id).await?;

    Ok(Json(UserView::from(account)))
}

/// PUT /users/{id}
/// Self-service profile update; only the account holder may touch their row.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    BearerIdentity(identity): BearerIdentity,
    Path(id): Path<i32>,
    payload: Option<Json<UpdateRequest>>,
) -> Result<Json<UserView>, ApiError> {
    // A bodyless request still has to hit the ownership check, not a parse
    // rejection.
    let patch = ProfilePatch {
        username: payload.and_then(|Json(body)| body.username),
    };

    let account = state.accounts().update_profile(identity, id, patch).await?;

    Ok(Json(UserView::from(account)))
}
