/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body `{"error": "..."}`)
 * - account / profile store のエラーを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::identity::AccountError;
use crate::services::profile::ProfileStoreError;

pub const MISSING_CREDENTIALS: &str = "Missing or invalid Authorization header";
pub const INVALID_TOKEN: &str = "Invalid token";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    // Never says which role was required.
    #[error("Access denied: insufficient permissions")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Request timed out")]
    Timeout,
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccountError> for AppError {
    fn from(e: AccountError) -> Self {
        if e.is_rejection() {
            return AppError::bad_request(e.to_string());
        }
        tracing::error!(error = %e, "account directory failure");
        AppError::Internal
    }
}

impl From<ProfileStoreError> for AppError {
    fn from(e: ProfileStoreError) -> Self {
        tracing::error!(error = %e, "profile store failure");
        AppError::Internal
    }
}
