//! Authentication and authorization module
//!
//! Everything between a raw Authorization header and an authorized
//! account lives here:
//! - Bearer token generation and validation (access + refresh)
//! - Action tokens for email verification and password reset links
//! - Password hashing with bcrypt
//! - The token revocation blocklist
//! - Request guards and the role gate
//! - The account service

pub mod action_token;
pub mod guard;
pub mod jwt;
pub mod models;
pub mod password;
pub mod revocation;
pub mod service;

pub use action_token::ActionTokenError;
pub use guard::{
    authenticate, authorize, require_access_token, require_principal, require_refresh_token,
    AuthenticatedUser, TokenKind,
};
pub use jwt::{decode_token, issue_access_token, issue_refresh_token, Claims, JwtError};
pub use models::{
    LoginRequest, LoginResponse, MessageResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, SignupRequest, TokenRefreshResponse, User, UserRole, UserWithBooks,
};
pub use password::{hash_password, verify_password};
pub use revocation::{RevocationStore, REVOCATION_TTL_SECS};
pub use service::AuthService;
