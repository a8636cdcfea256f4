//! Authentication gate: bearer token → verified subject → resolved role → `IdentityCtx`.
//!
//! Per request:
//! 1. public path → pass through, no `IdentityCtx`
//! 2. `Authorization: Bearer <token>` missing or malformed → 401
//! 3. token verification fails (any reason, or timeout) → 401
//! 4. role resolved (never fails, STAFF by default) → `IdentityCtx` inserted into extensions
//!
//! Nothing shared is written; each request gets its own context.

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::IdentityCtx;
use crate::error::{AppError, INVALID_TOKEN, MISSING_CREDENTIALS};
use crate::middleware::auth::public_paths::PublicPaths;
use crate::services::identity::TokenVerifier;
use crate::services::roles::RoleResolver;

#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
    roles: RoleResolver,
    public_paths: PublicPaths,
    verify_timeout: Duration,
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("roles", &self.roles)
            .field("public_paths", &self.public_paths)
            .field("verify_timeout", &self.verify_timeout)
            .finish()
    }
}

impl AuthGate {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        roles: RoleResolver,
        public_paths: PublicPaths,
        verify_timeout: Duration,
    ) -> Self {
        Self {
            verifier,
            roles,
            public_paths,
            verify_timeout,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.matches(path)
    }

    /// Verify `token` and build the request's identity.
    ///
    /// Every verification failure maps to the same 401; the reason is only logged.
    pub async fn identify(&self, token: &str) -> Result<IdentityCtx, AppError> {
        let verified = match tokio::time::timeout(self.verify_timeout, self.verifier.verify(token)).await {
            Ok(Ok(verified)) => verified,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "token verification failed");
                return Err(AppError::Unauthorized(INVALID_TOKEN));
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.verify_timeout.as_millis() as u64,
                    "token verification timed out"
                );
                return Err(AppError::Unauthorized(INVALID_TOKEN));
            }
        };

        let role = self.roles.resolve_role(&verified.subject_id).await;

        Ok(IdentityCtx::new(verified.subject_id, verified.email, role))
    }
}

/// Put the gate in front of every route of `router`.
///
/// Apply it to the outermost router (after `nest`) so it sees full request paths.
pub fn apply<S>(router: Router<S>, gate: AuthGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, authenticate))
}

async fn authenticate(
    State(gate): State<AuthGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if gate.is_public(req.uri().path()) {
        tracing::debug!(path = %req.uri().path(), "public path, skipping authentication");
        return Ok(next.run(req).await);
    }

    let Some(token) = bearer_token(req.headers()).map(str::to_owned) else {
        tracing::debug!(path = %req.uri().path(), "missing or invalid Authorization header");
        return Err(AppError::Unauthorized(MISSING_CREDENTIALS));
    };

    let identity = gate.identify(&token).await?;
    tracing::debug!(
        subject_id = %identity.subject_id,
        role = %identity.role,
        "request authenticated"
    );

    // middleware → extractor / role guard への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// `Authorization: Bearer <token>` → `<token>`. Any other scheme, or an empty token, is `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use serde_json::{Map, json};

    use crate::model::Role;
    use crate::services::cache::MemoryCacheClient;
    use crate::services::identity::{TokenError, VerifiedToken};
    use crate::services::profile::{KvProfileStore, ProfileStore, ROLE_FIELD};

    struct OneToken;

    #[async_trait]
    impl TokenVerifier for OneToken {
        async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
            match token {
                "good" => Ok(VerifiedToken {
                    subject_id: "u1".into(),
                    email: Some("u1@example.com".into()),
                    claims: Map::new(),
                }),
                "expired" => Err(TokenError::Expired),
                _ => Err(TokenError::InvalidSignature),
            }
        }
    }

    struct NeverAnswers;

    #[async_trait]
    impl TokenVerifier for NeverAnswers {
        async fn verify(&self, _: &str) -> Result<VerifiedToken, TokenError> {
            std::future::pending().await
        }
    }

    fn gate_with(verifier: Arc<dyn TokenVerifier>, store: Arc<dyn ProfileStore>) -> AuthGate {
        AuthGate::new(
            verifier,
            RoleResolver::new(store, Duration::from_millis(200)),
            PublicPaths::new(["/api/public/**"]),
            Duration::from_millis(50),
        )
    }

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_requires_bearer_scheme() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic xyz")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn identify_attaches_stored_role() {
        let store = Arc::new(KvProfileStore::new(MemoryCacheClient::new()));
        store.set_field("u1", ROLE_FIELD, json!("ADMIN")).await.unwrap();
        let gate = gate_with(Arc::new(OneToken), store);

        let identity = gate.identify("good").await.unwrap();
        assert_eq!(
            identity,
            IdentityCtx::new("u1", Some("u1@example.com".into()), Role::Admin)
        );
    }

    #[tokio::test]
    async fn identify_defaults_to_staff_without_profile() {
        let store = Arc::new(KvProfileStore::new(MemoryCacheClient::new()));
        let gate = gate_with(Arc::new(OneToken), store);

        assert_eq!(gate.identify("good").await.unwrap().role, Role::Staff);
    }

    #[tokio::test]
    async fn verification_failures_are_indistinguishable() {
        let store = Arc::new(KvProfileStore::new(MemoryCacheClient::new()));
        let gate = gate_with(Arc::new(OneToken), store);

        for token in ["expired", "forged"] {
            let err = gate.identify(token).await.unwrap_err();
            assert_eq!(err.to_string(), INVALID_TOKEN);
        }
    }

    #[tokio::test]
    async fn verifier_timeout_is_unauthorized() {
        let store = Arc::new(KvProfileStore::new(MemoryCacheClient::new()));
        let gate = gate_with(Arc::new(NeverAnswers), store);

        let err = gate.identify("good").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(INVALID_TOKEN)));
    }
}
