//! Account models and auth wire types
//!
//! Defines the account record, the role enum, and the request/response
//! bodies for the auth endpoints. The stored password hash rides along on
//! [`User`] for service-layer checks but is never serialized outward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::books::models::Book;

/// Account role
///
/// - User: standard account, can manage books and add reviews
/// - Admin: additionally sees all reviews, deletes reviews and accounts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Convert role to string representation
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Parse role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account record
///
/// Maps to the `user_accounts` table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    /// Unique account identifier
    pub uid: Uuid,

    /// Short display handle
    pub username: String,

    /// Optional given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Email address (unique, used for login)
    pub email: String,

    /// Account role
    pub role: UserRole,

    /// Whether the email address has been verified
    pub is_verified: bool,

    /// Hashed password (bcrypt)
    /// This field is never serialized in API responses
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Signup request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 8))]
    pub username: String,

    #[validate(length(max = 25))]
    pub first_name: Option<String>,

    #[validate(email, length(max = 40))]
    pub email: String,

    #[validate(length(min = 6))]
    pub password: String,

    #[serde(default)]
    pub role: UserRole,
}

/// Login request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Identity summary echoed back on login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginUser {
    pub email: String,
    pub uid: Uuid,
}

/// Login response with both tokens
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: LoginUser,
}

/// Response carrying a fresh access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenRefreshResponse {
    pub access_token: String,
}

/// Plain confirmation message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
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

/// Password reset request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email)]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    #[validate(length(min = 6))]
    pub new_password: String,
    pub confirm_new_password: String,
}

/// Account profile with owned books, the `/auth/me` response
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithBooks {
    #[serde(flatten)]
    pub user: User,
    pub books: Vec<Book>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_conversion() {
        assert_eq!(UserRole::User.as_str(), "user");
        assert_eq!(UserRole::Admin.as_str(), "admin");

        assert_eq!(UserRole::from_str("user"), Some(UserRole::User));
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("superuser"), None);
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(UserRole::default(), UserRole::User);

        let req: SignupRequest = serde_json::from_value(serde_json::json!({
            "username": "jane",
            "email": "jane@example.com",
            "password": "secret1"
        }))
        .unwrap();
        assert_eq!(req.role, UserRole::User);
    }

    #[test]
    fn test_signup_validation_bounds() {
        let valid = SignupRequest {
            username: "jane".to_string(),
            first_name: Some("Jane".to_string()),
            email: "jane@example.com".to_string(),
            password: "secret1".to_string(),
            role: UserRole::User,
        };
        assert!(valid.validate().is_ok());

        let long_username = SignupRequest {
            username: "ninechars".to_string(),
            ..valid.clone()
        };
        assert!(long_username.validate().is_err());

        let short_password = SignupRequest {
            password: "short".to_string(),
            ..valid.clone()
        };
        assert!(short_password.validate().is_err());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let long_first_name = SignupRequest {
            first_name: Some("x".repeat(26)),
            ..valid
        };
        assert!(long_first_name.validate().is_err());
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            uid: Uuid::new_v4(),
            username: "jane".to_string(),
            first_name: None,
            email: "jane@example.com".to_string(),
            role: UserRole::User,
            is_verified: false,
            password_hash: "$2b$12$secret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$12$secret"));
        assert!(json.contains("\"role\":\"user\""));
    }

    #[test]
    fn test_user_with_books_flattens_profile() {
        let user = User {
            uid: Uuid::new_v4(),
            username: "jane".to_string(),
            first_name: None,
            email: "jane@example.com".to_string(),
            role: UserRole::Admin,
            is_verified: true,
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(UserWithBooks {
            user,
            books: vec![],
        })
        .unwrap();

        assert_eq!(json["email"], "jane@example.com");
        assert_eq!(json["role"], "admin");
        assert!(json["books"].as_array().unwrap().is_empty());
    }
}
