/*
 * Responsibility
 * - register / admin 系の request/response DTO
 * - validate() で必須項目・role 名を検査する (形式チェックのみ)
 */
use serde::{Deserialize, Serialize};

use crate::model::Role;

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required_password(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// Returns `(email, password)`.
    pub fn validate(&self) -> Result<(&str, &str), String> {
        match (required(&self.email), required_password(&self.password)) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => Err("Email and password are required".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl CreateUserRequest {
    /// Returns `(email, password, role)`.
    pub fn validate(&self) -> Result<(&str, &str, Role), String> {
        let (Some(email), Some(password), Some(role)) = (
            required(&self.email),
            required_password(&self.password),
            required(&self.role),
        ) else {
            return Err("Email, password and role are required".to_string());
        };

        let role = role.parse::<Role>().map_err(|e| e.to_string())?;
        Ok((email, password, role))
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

impl UpdateRoleRequest {
    pub fn validate(&self) -> Result<Role, String> {
        let role = required(&self.role).ok_or_else(|| "Role is required".to_string())?;
        role.parse::<Role>().map_err(|e| e.to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub message: String,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<Role>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_both_fields() {
        let req = RegisterRequest {
            email: Some("a@example.com".into()),
            password: None,
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: Some("  ".into()),
            password: Some("secret1".into()),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_user_rejects_unknown_role_with_valid_names() {
        let req = CreateUserRequest {
            email: Some("a@example.com".into()),
            password: Some("secret1".into()),
            role: Some("WIZARD".into()),
        };
        let err = req.validate().unwrap_err();
        assert!(err.contains("SUPER_ADMIN, ADMIN, STAFF"), "{err}");
    }

    #[test]
    fn update_role_parses_any_case() {
        let req = UpdateRoleRequest {
            role: Some("staff".into()),
        };
        assert_eq!(req.validate(), Ok(Role::Staff));
    }
}
