use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::collections::BTreeMap;
use std::fmt;

use crate::locale::keys;
use crate::services::AccountError;

/// Closed set of boundary failures. Every variant maps to exactly one HTTP
/// status and one message key; the envelope layer renders the body.
#[derive(Debug)]
pub enum ApiError {
    Validation(BTreeMap<&'static str, &'static str>),

    Authentication,

    InactiveAccount,

    UnauthorizedUpdate,

    NotFound,

    InvalidActivationToken,

    EmailDispatch,

    Internal(String),
}

/// What the error envelope layer needs to build the response body. Attached
/// to the response as an extension so the layer can see the request path and
/// negotiated language that handlers never had.
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub message_key: &'static str,
    pub validation: Option<BTreeMap<&'static str, &'static str>>,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidActivationToken => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::InactiveAccount | Self::UnauthorizedUpdate => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailDispatch => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::Validation(_) => keys::VALIDATION_FAILURE,
            Self::Authentication => keys::AUTHENTICATION_FAILURE,
            Self::InactiveAccount => keys::INACTIVE_ACCOUNT,
            Self::UnauthorizedUpdate => keys::UNAUTHORIZED_USER_UPDATE,
            Self::NotFound => keys::USER_NOT_FOUND,
            Self::InvalidActivationToken => keys::ACCOUNT_ACTIVATION_FAILURE,
            Self::EmailDispatch => keys::EMAIL_FAILURE,
            Self::Internal(_) => keys::INTERNAL_FAILURE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(fields) => write!(f, "Validation failure: {fields:?}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
            other => write!(f, "{}", other.message_key()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(msg) = &self {
            tracing::error!("Internal error: {msg}");
        }

        let status = self.status();
        let payload = ErrorPayload {
            message_key: self.message_key(),
            validation: match self {
                Self::Validation(fields) => Some(fields),
                _ => None,
            },
        };

        let mut response = status.into_response();
        response.extensions_mut().insert(payload);
        response
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailInUse => {
                let mut fields = BTreeMap::new();
                fields.insert("email", keys::EMAIL_IN_USE);
                Self::Validation(fields)
            }
            AccountError::InvalidCredentials => Self::Authentication,
            AccountError::InactiveAccount => Self::InactiveAccount,
            AccountError::UnauthorizedUpdate => Self::UnauthorizedUpdate,
            AccountError::NotFound => Self::NotFound,
            AccountError::InvalidActivationToken => Self::InvalidActivationToken,
            AccountError::EmailDispatch => Self::EmailDispatch,
            AccountError::Database(msg) | AccountError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
