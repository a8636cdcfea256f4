/*
 * Responsibility
 * - /profile 系 handler (自分自身 / 任意の userId)
 * - account は AccountDirectory, 任意フィールドは ProfileStore から読む
 * - profile 書き込みで role は変えられない (role 変更は admin API のみ)
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::{
        dto::{profile::ProfileResponse, users::MessageResponse},
        extractors::{ApiJson, CurrentIdentity},
    },
    error::AppError,
    services::profile::{self, ProfileDocument},
    state::AppState,
};

async fn load_profile(state: &AppState, uid: &str) -> Result<ProfileResponse, AppError> {
    let account = state
        .accounts
        .get(uid)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    let profile = match state.profiles.get(uid).await? {
        Some(doc) => doc,
        None => {
            tracing::info!(subject_id = uid, "no profile document");
            ProfileDocument::new()
        }
    };

    Ok(ProfileResponse {
        uid: account.uid,
        email: account.email,
        display_name: account.display_name,
        profile,
    })
}

async fn save_profile(state: &AppState, uid: &str, doc: ProfileDocument) -> Result<Json<MessageResponse>, AppError> {
    profile::replace_preserving_role(state.profiles.as_ref(), uid, doc).await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

pub async fn get_own_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(load_profile(&state, &identity.subject_id).await?))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    Ok(Json(load_profile(&state, &user_id).await?))
}

pub async fn update_own_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    ApiJson(doc): ApiJson<ProfileDocument>,
) -> Result<Json<MessageResponse>, AppError> {
    save_profile(&state, &identity.subject_id, doc).await
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(doc): ApiJson<ProfileDocument>,
) -> Result<Json<MessageResponse>, AppError> {
    if state.accounts.get(&user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }
    save_profile(&state, &user_id, doc).await
}
