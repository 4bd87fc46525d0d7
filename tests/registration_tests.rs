mod common;

use axum::http::{Request, StatusCode, header};
use common::{body_json, get, post_json, spawn_app};
use serde_json::json;
use tower::ServiceExt;

fn valid_registration() -> serde_json::Value {
    json!({
        "username": "user1",
        "email": "user1@mail.com",
        "password": "P4ssword"
    })
}

#[tokio::test]
async fn register_returns_200_with_success_message() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "User created");
}

#[tokio::test]
async fn register_persists_an_inactive_account_with_activation_token() {
    let app = spawn_app().await;

    app.router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();

    let account = app
        .state
        .store
        .find_account_by_email("user1@mail.com")
        .await
        .unwrap()
        .expect("account persisted");
    assert!(account.inactive);

    // The token delivered by mail is the one stored on the row.
    let token = app.mailer.last_token().expect("activation mail sent");
    let by_token = app
        .state
        .store
        .find_account_by_activation_token(&token)
        .await
        .unwrap();
    assert!(by_token.is_some_and(|a| a.email == "user1@mail.com"));
}

#[tokio::test]
async fn register_stores_a_hash_and_never_the_plaintext() {
    let app = spawn_app().await;

    app.router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();

    let (_, hash) = app
        .state
        .store
        .find_account_with_password("user1@mail.com")
        .await
        .unwrap()
        .unwrap();
    let hash = hash.expect("hash stored");

    assert_ne!(hash, "P4ssword");
    assert!(hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn register_ignores_client_supplied_inactive_flag() {
    let app = spawn_app().await;

    let mut body = valid_registration();
    body["inactive"] = json!(false);

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let account = app
        .state
        .store
        .find_account_by_email("user1@mail.com")
        .await
        .unwrap()
        .unwrap();
    assert!(account.inactive);
}

#[tokio::test]
async fn register_with_missing_fields_returns_field_keyed_errors() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Validation failure");
    assert_eq!(body["validationErrors"]["username"], "Username is required");
    assert_eq!(body["validationErrors"]["email"], "E-mail is required");
    assert_eq!(body["validationErrors"]["password"], "Password is required");
}

#[tokio::test]
async fn register_validation_covers_size_format_and_pattern() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/1.0/users",
            &json!({
                "username": "usr",
                "email": "not-an-email",
                "password": "alllowercase"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["validationErrors"]["username"],
        "Username must have min 4 and max 32 characters"
    );
    assert_eq!(body["validationErrors"]["email"], "E-mail must be valid");
    assert_eq!(
        body["validationErrors"]["password"],
        "Password must have at least 1 uppercase letter, 1 lowercase letter and 1 number"
    );
}

#[tokio::test]
async fn register_rejects_an_email_already_in_use() {
    let app = spawn_app().await;

    app.router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();

    let mut second = valid_registration();
    second["username"] = json!("otheruser");

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &second))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["validationErrors"]["email"], "E-mail in use");
}

#[tokio::test]
async fn register_validation_message_is_localized() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/1.0/users")
                .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .header(header::ACCEPT_LANGUAGE, "es")
                .body(axum::body::Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["message"], "Error de validación");
    assert_eq!(
        body["validationErrors"]["username"],
        "El nombre de usuario es obligatorio"
    );
}

#[tokio::test]
async fn register_rolls_back_when_mail_dispatch_fails() {
    let app = spawn_app().await;
    app.mailer.set_failing(true);

    let response = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "E-mail Failure");

    // Atomicity: the failed dispatch must leave no row behind.
    let account = app
        .state
        .store
        .find_account_by_email("user1@mail.com")
        .await
        .unwrap();
    assert!(account.is_none());

    // The address is usable again once mail delivery recovers.
    app.mailer.set_failing(false);
    let retry = app
        .router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();
    assert_eq!(retry.status(), StatusCode::OK);
}

#[tokio::test]
async fn activation_consumes_the_token_exactly_once() {
    let app = spawn_app().await;

    app.router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();
    let token = app.mailer.last_token().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/api/1.0/users/token/{token}"),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Account is activated");

    let account = app
        .state
        .store
        .find_account_by_email("user1@mail.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!account.inactive);
    assert!(
        app.state
            .store
            .find_account_by_activation_token(&token)
            .await
            .unwrap()
            .is_none(),
        "token cleared on activation"
    );

    // Re-submitting the consumed token is indistinguishable from an unknown
    // one.
    let replay = app
        .router
        .clone()
        .oneshot(post_json(
            &format!("/api/1.0/users/token/{token}"),
            &json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::BAD_REQUEST);
    let body = body_json(replay).await;
    assert_eq!(
        body["message"],
        "This account is either active or the token is invalid"
    );
}

#[tokio::test]
async fn activation_with_unknown_token_returns_400() {
    let app = spawn_app().await;

    let response = app
        .router
        .clone()
        .oneshot(post_json(
            "/api/1.0/users/token/this-token-does-not-exist",
            &json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn activated_account_becomes_visible_to_lookup() {
    let app = spawn_app().await;

    app.router
        .clone()
        .oneshot(post_json("/api/1.0/users", &valid_registration()))
        .await
        .unwrap();
    let account = app
        .state
        .store
        .find_account_by_email("user1@mail.com")
        .await
        .unwrap()
        .unwrap();

    // Invisible while inactive.
    let before = app
        .router
        .clone()
        .oneshot(get(&format!("/api/1.0/users/{}", account.id)))
        .await
        .unwrap();
    assert_eq!(before.status(), StatusCode::NOT_FOUND);

    let token = app.mailer.last_token().unwrap();
    app.router
        .clone()
        .oneshot(post_json(
            &format!("/api/1.0/users/token/{token}"),
            &json!({}),
        ))
        .await
        .unwrap();

    let after = app
        .router
        .clone()
        .oneshot(get(&format!("/api/1.0/users/{}", account.id)))
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::OK);
}
