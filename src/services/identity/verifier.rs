/*
 * Responsibility
 * - identity provider が発行した bearer token を検証する境界 (trait)
 * - 失敗理由 (署名 / 期限切れ / 形式) は区別して返すが、gate 側では全て 401 に潰す
 */
use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A token the identity provider vouched for.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub subject_id: String,
    pub email: Option<String>,
    pub claims: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError>;
}
