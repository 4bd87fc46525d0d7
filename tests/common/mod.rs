#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, header},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use roster::api;
use roster::auth::password;
use roster::config::Config;
use roster::db::NewAccount;
use roster::mail::MockMailer;
use roster::state::SharedState;

pub struct TestApp {
    pub router: Router,
    pub state: Arc<SharedState>,
    pub mailer: Arc<MockMailer>,
}

pub async fn spawn_app() -> TestApp {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // Cheap hashing params keep the suite fast; verification reads params
    // from the stored PHC string so the value itself does not matter.
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;

    let mailer = Arc::new(MockMailer::new());
    let shared = Arc::new(
        SharedState::with_mailer(config, mailer.clone())
            .await
            .expect("Failed to build test state"),
    );
    let router = api::router(api::create_app_state(shared.clone()));

    TestApp {
        router,
        state: shared,
        mailer,
    }
}

/// Seed `user1..userN` rows: `active` confirmed accounts followed by
/// `inactive` unconfirmed ones, all with password `P4ssword`.
pub async fn add_users(app: &TestApp, active: u32, inactive: u32) {
    let hash = password::hash("P4ssword", &app.state.config.security)
        .await
        .expect("Failed to hash seed password");

    for i in 1..=(active + inactive) {
        app.state
            .store
            .create_account(NewAccount {
                username: format!("user{i}"),
                email: format!("user{i}@mail.com"),
                password_hash: Some(hash.clone()),
                inactive: i > active,
                activation_token: None,
            })
            .await
            .expect("Failed to seed account");
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub fn basic_auth_header(email: &str, password: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{email}:{password}")))
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Authenticate via the API and return the issued bearer token.
pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/1.0/auth",
            &serde_json::json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    body["token"].as_str().expect("login token").to_string()
}
