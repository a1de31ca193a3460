use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use validator::Validate;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TEAM_MEMBER: &str = "team_member";
pub const VALID_ROLES: [&str; 2] = [ROLE_ADMIN, ROLE_TEAM_MEMBER];

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 80, message = "username must be 1-80 characters"))]
    pub username: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DebugDeleteUserRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponseData {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: ROLE_TEAM_MEMBER.to_string(),
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }

    #[test]
    fn register_request_rejects_bad_email() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
            role: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn register_request_accepts_minimal_payload() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"username":"alice","email":"a@x.com","password":"pw"}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.role.is_none());
    }

    #[test]
    fn profile_update_fields_default_to_absent() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"email":"new@x.com"}"#).unwrap();
        assert!(req.username.is_none());
        assert_eq!(req.email.as_deref(), Some("new@x.com"));
    }
}
