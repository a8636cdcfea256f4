use axum::Json;

use crate::api::dto::users::RolesResponse;
use crate::model::Role;

pub async fn list_roles() -> Json<RolesResponse> {
    Json(RolesResponse {
        roles: Role::ALL.to_vec(),
    })
}
