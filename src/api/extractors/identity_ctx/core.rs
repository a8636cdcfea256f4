use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::{AppError, MISSING_CREDENTIALS};

use super::IdentityCtx;

/// Handler で IdentityCtx を受け取るための extractor
/// gate middleware が IdentityCtx を request.extensions() に insert 済みである前提
/// 見つからない場合は 401 を返す（public path 上の handler など、認証がかかっていない）
pub struct CurrentIdentity(pub IdentityCtx);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityCtx>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Unauthorized(MISSING_CREDENTIALS))
    }
}
