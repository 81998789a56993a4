// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, signup, logout and forced-logout tests.

use curapets::error::{ClientError, SESSION_EXPIRED_MESSAGE};
use curapets::models::{LoginForm, Role, SignupForm};
use curapets::services::{Mount, SessionState, UnauthenticatedReason};
use curapets::storage::{Persistence, StoredTokens, TokenTier};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;
use common::{create_test_app, make_jwt, user_json};

async fn mount_login(server: &MockServer, access: &str) {
    Mock::given(method("POST"))
        .and(path("/api/user/login/"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": access,
            "refresh": "refresh-1",
            "role": "user"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_without_remember_uses_ephemeral_tier_only() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    let access = make_jwt(3600);
    mount_login(&server, &access).await;

    let outcome = t
        .app
        .auth
        .login(&LoginForm::new("ada@example.com", "hunter22", false))
        .await
        .unwrap();

    assert_eq!(outcome.persistence, Persistence::Ephemeral);
    assert_eq!(outcome.role, Some(Role::User));
    assert!(t.tiers.durable.read().unwrap().is_none());
    assert_eq!(t.tiers.ephemeral.read().unwrap().unwrap().access, access);

    // The login session ends: the ephemeral tier is wiped externally
    t.tiers.ephemeral.remove().unwrap();

    let state = t.app.session.resolve(&Mount::new()).await.unwrap();
    assert_eq!(
        state,
        SessionState::Unauthenticated(UnauthenticatedReason::NoSession)
    );
}

#[tokio::test]
async fn test_login_with_remember_uses_durable_tier() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);
    let access = make_jwt(3600);
    mount_login(&server, &access).await;

    // A stale ephemeral session must not survive the new login
    t.tiers
        .ephemeral
        .write(&StoredTokens::new("stale", None))
        .unwrap();

    let outcome = t
        .app
        .auth
        .login(&LoginForm::new("ada@example.com", "hunter22", true))
        .await
        .unwrap();

    assert_eq!(outcome.persistence, Persistence::Durable);
    assert!(t.tiers.ephemeral.read().unwrap().is_none());
    assert_eq!(t.app.store.get().as_deref(), Some(access.as_str()));
    assert_eq!(t.app.store.refresh_token().as_deref(), Some("refresh-1"));
    assert_eq!(t.notices.messages(), vec!["Login successful"]);
}

#[tokio::test]
async fn test_invalid_login_form_is_never_sent() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    let err = t
        .app
        .auth
        .login(&LoginForm::new("not-an-email", "", false))
        .await
        .unwrap_err();

    match err {
        ClientError::Validation(errors) => {
            assert_eq!(errors["email"], "Enter a valid email address");
            assert_eq!(errors["password"], "Password is required");
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_credentials_do_not_touch_store() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    t.tiers
        .durable
        .write(&StoredTokens::new("existing", None))
        .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/user/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let err = t
        .app
        .auth
        .login(&LoginForm::new("ada@example.com", "wrong-pass", true))
        .await
        .unwrap_err();

    assert!(!err.is_auth_error());
    assert_eq!(err.user_message(), "Invalid email or password");
    assert_eq!(t.app.store.get().as_deref(), Some("existing"));
}

#[tokio::test]
async fn test_signup_sends_form_without_terms_flag() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    Mock::given(method("POST"))
        .and(path("/api/user/signup/"))
        .and(body_json(json!({
            "email": "vet@example.com",
            "firstname": "Kemi",
            "lastname": "Ade",
            "password": "longenough",
            "role": "doctor"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let form = SignupForm::new("vet@example.com", "Kemi", "Ade", "longenough", Role::Doctor, true);
    t.app.auth.signup(&form).await.unwrap();

    // Signing up does not log in
    assert!(t.app.store.get().is_none());
}

#[tokio::test]
async fn test_signup_field_errors_from_backend() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    Mock::given(method("POST"))
        .and(path("/api/user/signup/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["user with this email already exists."]
        })))
        .mount(&server)
        .await;

    let form = SignupForm::new("vet@example.com", "Kemi", "Ade", "longenough", Role::User, true);
    let err = t.app.auth.signup(&form).await.unwrap_err();

    assert_eq!(
        err.user_message(),
        "email: user with this email already exists."
    );
}

#[tokio::test]
async fn test_signup_requires_terms() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    let form = SignupForm::new("vet@example.com", "Kemi", "Ade", "longenough", Role::User, false);
    let err = t.app.auth.signup(&form).await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(ref e) if e.contains_key("terms")));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_clears_both_tiers() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    t.tiers.durable.write(&StoredTokens::new("a", None)).unwrap();
    t.tiers.ephemeral.write(&StoredTokens::new("b", None)).unwrap();

    t.app.auth.logout().unwrap();

    assert!(t.app.store.get().is_none());
    assert!(t.tiers.durable.read().unwrap().is_none());
    assert!(t.tiers.ephemeral.read().unwrap().is_none());
}

#[tokio::test]
async fn test_guard_forces_logout_on_401() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    t.tiers
        .store
        .set(&StoredTokens::new(make_jwt(3600), None), Persistence::Durable)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("user")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pets/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&server)
        .await;

    let session = t.app.session.session(&Mount::new()).await.unwrap();
    let err = session
        .guard(t.app.api.list_pets(session.token()).await)
        .unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired));
    assert!(t.app.store.get().is_none());
    assert_eq!(t.notices.messages(), vec![SESSION_EXPIRED_MESSAGE]);
}

#[tokio::test]
async fn test_guard_passes_other_errors_through() {
    let server = MockServer::start().await;
    let t = create_test_app(&server);

    t.tiers
        .store
        .set(&StoredTokens::new(make_jwt(3600), None), Persistence::Durable)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/user/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("user")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pets/3/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let session = t.app.session.session(&Mount::new()).await.unwrap();
    let err = session
        .guard(t.app.api.get_pet(session.token(), 3).await)
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 404, .. }));
    assert!(t.app.store.get().is_some());
    assert!(t.notices.messages().is_empty());
}
