/*
 * Responsibility
 * - POST /public/register (認証なし)
 * - POST /admin/user (SUPER_ADMIN), PUT /admin/user/{user_id}/role (ADMIN)
 * - role の要件チェックは routes 側の RoleGuard が行う。ここでは割り当て可否 (can_assign) のみ
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::{
        dto::users::{
            CreateUserRequest, CreateUserResponse, MessageResponse, RegisterRequest,
            RegisterResponse, UpdateRoleRequest,
        },
        extractors::{ApiJson, CurrentIdentity},
    },
    error::AppError,
    services::roles::RoleUpdate,
    state::AppState,
};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let (email, password) = req.validate().map_err(AppError::bad_request)?;

    let account = state.accounts.create(email, password).await?;
    tracing::info!(subject_id = %account.uid, "user registered");

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user_id: account.uid,
    }))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentIdentity(actor): CurrentIdentity,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<Json<CreateUserResponse>, AppError> {
    let (email, password, role) = req.validate().map_err(AppError::bad_request)?;

    // Checked before the account exists so a rejected assignment leaves nothing behind.
    if !actor.role.can_assign(role) {
        return Err(AppError::Forbidden);
    }

    let account = state.accounts.create(email, password).await?;

    let error = match state.roles.try_update_role(&account.uid, role, actor.role).await {
        RoleUpdate::Applied => None,
        RoleUpdate::Rejected => Some(AppError::Forbidden),
        RoleUpdate::Failed => Some(AppError::Internal),
    };
    if let Some(error) = error {
        discard_account(&state, &account.uid).await;
        return Err(error);
    }

    tracing::info!(
        subject_id = %account.uid,
        role = %role,
        created_by = %actor.subject_id,
        "user created"
    );

    Ok(Json(CreateUserResponse {
        message: "User created successfully".to_string(),
        user_id: account.uid,
        role,
    }))
}

// An account whose role could not be recorded is removed again, so the request can be retried.
async fn discard_account(state: &AppState, uid: &str) {
    match state.accounts.delete(uid).await {
        Ok(_) => tracing::warn!(subject_id = uid, "role not recorded, account removed"),
        Err(err) => tracing::error!(
            subject_id = uid,
            error = %err,
            "role not recorded and account removal failed"
        ),
    }
}

pub async fn update_user_role(
    State(state): State<AppState>,
    CurrentIdentity(actor): CurrentIdentity,
    Path(user_id): Path<String>,
    ApiJson(req): ApiJson<UpdateRoleRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let role = req.validate().map_err(AppError::bad_request)?;

    if state.accounts.get(&user_id).await?.is_none() {
        return Err(AppError::NotFound("User"));
    }

    match state.roles.try_update_role(&user_id, role, actor.role).await {
        RoleUpdate::Applied => Ok(Json(MessageResponse::new("Role updated successfully"))),
        RoleUpdate::Rejected => Err(AppError::Forbidden),
        RoleUpdate::Failed => Err(AppError::Internal),
    }
}
