#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use identity_api::app::build_router;
use identity_api::model::Role;
use identity_api::services::cache::MemoryCacheClient;
use identity_api::services::identity::{
    MemoryAccountDirectory, TokenError, TokenVerifier, VerifiedToken,
};
use identity_api::services::profile::{KvProfileStore, ProfileStore, ROLE_FIELD};
use identity_api::state::{AppState, AuthSettings};
use serde_json::Value;
use tower::ServiceExt;

/// Accepts only tokens handed out by [`StaticTokenVerifier::issue`].
#[derive(Default)]
pub struct StaticTokenVerifier {
    tokens: RwLock<HashMap<String, VerifiedToken>>,
}

impl StaticTokenVerifier {
    pub fn issue(&self, subject_id: &str, email: Option<&str>) -> String {
        let token = format!("token-{subject_id}");
        self.tokens.write().expect("lock").insert(
            token.clone(),
            VerifiedToken {
                subject_id: subject_id.to_string(),
                email: email.map(str::to_string),
                claims: Default::default(),
            },
        );
        token
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.tokens
            .read()
            .expect("lock")
            .get(token)
            .cloned()
            .ok_or(TokenError::InvalidSignature)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub verifier: Arc<StaticTokenVerifier>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_profiles(Arc::new(KvProfileStore::new(MemoryCacheClient::new())))
    }

    pub fn with_profiles(profiles: Arc<dyn ProfileStore>) -> Self {
        let verifier = Arc::new(StaticTokenVerifier::default());
        let state = AppState::new(
            verifier.clone(),
            Arc::new(MemoryAccountDirectory::new()),
            profiles,
            AuthSettings::default(),
        );
        let router = build_router(state.clone());

        Self {
            router,
            state,
            verifier,
        }
    }

    /// Register an account, store `role` (if any) on its profile and return `(uid, token)`.
    pub async fn user(&self, email: &str, role: Option<Role>) -> (String, String) {
        let account = self
            .state
            .accounts
            .create(email, "secret123")
            .await
            .expect("create account");
        if let Some(role) = role {
            self.state
                .profiles
                .set_field(&account.uid, ROLE_FIELD, Value::from(role.as_str()))
                .await
                .expect("seed role");
        }
        let token = self.verifier.issue(&account.uid, Some(email));
        (account.uid, token)
    }

    pub async fn stored_role(&self, uid: &str) -> Option<Value> {
        self.state
            .profiles
            .get(uid)
            .await
            .expect("profile")
            .and_then(|doc| doc.get(ROLE_FIELD).cloned())
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("response")
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
