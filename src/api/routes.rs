/*
 * Responsibility
 * - /api 配下の URL 構造を定義
 * - role 要件は RoleGuard で route / group 単位に付与する (handler 内では判定しない)
 * - 認証 (gate) は app 側で Router 全体に掛ける
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::handlers::{
    health::health,
    profile::{get_own_profile, get_profile, update_own_profile, update_profile},
    roles::list_roles,
    users::{create_user, register, update_user_role},
};
use crate::middleware::auth::RoleGuard;
use crate::model::Role;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/public/health", get(health))
        .route("/public/register", post(register))
        .route("/profile", get(get_own_profile).post(update_own_profile))
        .route("/profile/{user_id}", get(get_profile).post(update_profile))
        .route("/roles", get(list_roles))
        .merge(admin_routes())
}

fn admin_routes() -> Router<AppState> {
    RoleGuard::group(Role::Admin)
        .route_requiring("/admin/user", post(create_user), Role::SuperAdmin)
        .route("/admin/user/{user_id}/role", put(update_user_role))
        .into_router()
}
