use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::convert::Infallible;

const DEFAULT_SIZE: u64 = 10;
const MAX_SIZE: u64 = 10;

/// Normalized paging parameters. Extraction never fails: whatever the
/// client sent collapses deterministically onto valid values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub size: u64,
}

#[derive(Debug, Default, Deserialize)]
struct RawPagination {
    page: Option<String>,
    size: Option<String>,
}

impl Pagination {
    /// `page`: non-numeric or negative collapses to 0. `size`: non-numeric,
    /// below 1 or above 10 collapses to 10.
    fn normalize(page: Option<&str>, size: Option<&str>) -> Self {
        let page = page.and_then(|raw| raw.parse::<u64>().ok()).unwrap_or(0);

        let size = size
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|parsed| (1..=MAX_SIZE).contains(parsed))
            .unwrap_or(DEFAULT_SIZE);

        Self { page, size }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let raw = Query::<RawPagination>::from_request_parts(parts, state)
            .await
            .map_or_else(|_| RawPagination::default(), |query| query.0);

        Ok(Self::normalize(raw.page.as_deref(), raw.size.as_deref()))
    }
}
