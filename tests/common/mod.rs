// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use curapets::config::Config;
use curapets::notices::RecordingNotices;
use curapets::storage::{MemoryTier, TokenStore};
use curapets::App;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

/// Claims the backend puts in its access tokens.
#[derive(Debug, Serialize)]
struct Claims {
    token_type: &'static str,
    exp: i64,
    iat: i64,
    user_id: u64,
}

/// Create an access token expiring `exp_offset_secs` from now (negative = expired).
///
/// Signed with a key the client never sees.
#[allow(dead_code)]
pub fn make_jwt(exp_offset_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        token_type: "access",
        exp: now + exp_offset_secs,
        iat: now,
        user_id: 7,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"backend-only-signing-key"),
    )
    .expect("Failed to create JWT")
}

/// Config pointing at a mock backend.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        api_base_url: server.uri(),
        media_upload_url: format!("{}/media/v1_1", server.uri()),
        media_host: "127.0.0.1".to_string(),
        http_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

/// Memory-backed store plus handles on each tier for simulating external wipes.
#[allow(dead_code)]
pub struct TestStore {
    pub store: TokenStore,
    pub durable: MemoryTier,
    pub ephemeral: MemoryTier,
}

#[allow(dead_code)]
pub fn test_store() -> TestStore {
    let durable = MemoryTier::new();
    let ephemeral = MemoryTier::new();
    let store = TokenStore::new(Arc::new(durable.clone()), Arc::new(ephemeral.clone()));
    TestStore {
        store,
        durable,
        ephemeral,
    }
}

/// App wired to a mock backend with in-memory tokens and recorded notices.
#[allow(dead_code)]
pub struct TestApp {
    pub app: App,
    pub tiers: TestStore,
    pub notices: Arc<RecordingNotices>,
}

#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> TestApp {
    let tiers = test_store();
    let notices = Arc::new(RecordingNotices::new());
    let app = App::new(test_config(server), tiers.store.clone(), notices.clone())
        .expect("Failed to build app");
    TestApp {
        app,
        tiers,
        notices,
    }
}

/// A `/api/user/me/` body.
#[allow(dead_code)]
pub fn user_json(role: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 7,
        "email": "ada@example.com",
        "firstname": "Ada",
        "lastname": "Obi",
        "role": role,
        "profilepicture": null
    })
}
