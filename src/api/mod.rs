use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenCodec;
use crate::config::Config;
use crate::db::Store;
use crate::services::AccountService;
use crate::state::SharedState;

pub mod auth;
mod envelope;
mod error;
mod pagination;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use pagination::Pagination;
pub use types::*;

pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn accounts(&self) -> &Arc<dyn AccountService> {
        &self.shared.accounts
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenCodec {
        &self.shared.tokens
    }
}

pub fn create_app_state(shared: Arc<SharedState>) -> Arc<AppState> {
    Arc::new(AppState { shared })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/users", post(users::post_user).get(users::list_users))
        .route("/users/token/{token}", post(users::activate_user))
        .route(
            "/users/{id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/auth", post(auth::post_auth))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    // The envelope layer rewrites error bodies, so it sits innermost; CORS
    // headers are added on the way out.
    Router::new()
        .nest("/api/1.0", api_router)
        .layer(middleware::from_fn(envelope::error_envelope))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
