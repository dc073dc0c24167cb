#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, Response},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use mav_api::{create_router, middleware::auth::TokenVerifier, AppState};
use mav_core::{
    authz::AllowList,
    memory::{MemoryStore, RecordingMessenger},
};

pub const SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub messenger: Arc<RecordingMessenger>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_webhook_secret(None)
    }

    pub fn with_webhook_secret(secret: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let messenger = Arc::new(RecordingMessenger::new());
        let state = AppState::new(
            store.clone(),
            store.clone(),
            messenger.clone(),
            TokenVerifier::from_secret(SECRET, None),
        )
        .with_notify_allowed(AllowList::new(["owner", "admin", "manager"]))
        .with_webhook_secret(secret.map(str::to_string));

        Self {
            store,
            messenger,
            router: create_router(state),
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (u16, Value) {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("request execution");
        read(response).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (u16, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(builder.body(Body::empty()).expect("request build"))
            .await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &Value) -> (u16, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(t) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {t}"));
        }
        self.send(
            builder
                .body(Body::from(body.to_string()))
                .expect("request build"),
        )
        .await
    }

    pub async fn webhook(&self, raw: impl Into<Body>) -> (u16, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/telegram/webhook")
            .header("content-type", "application/json")
            .body(raw.into())
            .expect("request build");
        self.send(req).await
    }
}

pub async fn read(response: Response<Body>) -> (u16, Value) {
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body extraction");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_secs()
}

pub fn token_for(sub: &str) -> String {
    sign(&json!({
        "sub": sub,
        "email": format!("{sub}@agency.test"),
        "role": "authenticated",
        "aud": "authenticated",
        "exp": now() + 3600,
    }), SECRET)
}

pub fn expired_token_for(sub: &str) -> String {
    sign(&json!({ "sub": sub, "exp": now() - 3600 }), SECRET)
}

pub fn sign(claims: &Value, secret: &[u8]) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret)).expect("token encode")
}

pub fn text_update(chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": 1000,
        "message": {
            "message_id": 1,
            "date": 1_700_000_000,
            "text": text,
            "chat": {"id": chat_id, "type": "group", "title": "Agency Floor"}
        }
    })
}

pub fn membership_update(chat_id: i64, old: &str, new: &str) -> Value {
    json!({
        "update_id": 1001,
        "my_chat_member": {
            "chat": {"id": chat_id, "type": "group", "title": "Agency Floor"},
            "from": {"id": 1, "is_bot": false, "first_name": "Ann"},
            "date": 1_700_000_000,
            "old_chat_member": {"status": old, "user": {"id": 2, "is_bot": true, "first_name": "bot"}},
            "new_chat_member": {"status": new, "user": {"id": 2, "is_bot": true, "first_name": "bot"}}
        }
    })
}
