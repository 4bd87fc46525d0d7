//! Error envelope layer.
//!
//! Handlers only produce [`ApiError`](super::ApiError) values carrying a
//! status and a message key; this layer is where the key meets the request:
//! it captures the path and the negotiated language before the handler runs
//! and renders any error payload into the body
//! `{ path, timestamp, message, validationErrors? }`.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{HeaderMap, header::ACCEPT_LANGUAGE, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::convert::Infallible;

use super::error::ErrorPayload;
use crate::locale::{self, Lang};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    path: String,
    timestamp: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation_errors: Option<BTreeMap<String, String>>,
}

pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let lang = negotiated_lang(request.headers());

    let response = next.run(request).await;

    let Some(payload) = response.extensions().get::<ErrorPayload>().cloned() else {
        return response;
    };

    let body = ErrorBody {
        path,
        timestamp: chrono::Utc::now().timestamp_millis(),
        message: locale::translate(lang, payload.message_key),
        validation_errors: payload.validation.map(|fields| {
            fields
                .into_iter()
                .map(|(field, key)| (field.to_string(), locale::translate(lang, key)))
                .collect()
        }),
    };

    (response.status(), Json(body)).into_response()
}

fn negotiated_lang(headers: &HeaderMap) -> Lang {
    Lang::from_header(
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok()),
    )
}

/// Handlers that localize success messages extract the negotiated language
/// directly.
impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(negotiated_lang(&parts.headers))
    }
}
