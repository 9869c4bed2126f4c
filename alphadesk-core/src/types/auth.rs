//! Authentication request and response types.

use serde::{Deserialize, Serialize};

/// Access and refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Long-lived credential used to mint new access tokens.
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new pair.
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Optional email, omitted when blank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Password.
    pub password: String,
    /// Terms acceptance.
    pub agreed: bool,
}

impl RegisterRequest {
    /// Create a registration request. A blank email is dropped.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        agreed: bool,
        email: Option<&str>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            password: password.into(),
            agreed,
        }
    }
}

/// User summary returned with login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email, if bound.
    #[serde(default)]
    pub email: Option<String>,
    /// Subscription tier.
    #[serde(default)]
    pub tier: Option<String>,
    /// Whether the bound email is verified.
    #[serde(default)]
    pub email_verified: Option<bool>,
}

/// Login/registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token (older backends omit it).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Authenticated user.
    pub user: AuthUser,
}

/// Refresh request body.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Logout request body; serializes to `{}` without a refresh token.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Full user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email, if bound.
    #[serde(default)]
    pub email: Option<String>,
    /// Subscription tier.
    #[serde(default)]
    pub tier: Option<String>,
    /// Whether an email is bound.
    #[serde(default)]
    pub has_email: bool,
    /// Whether the bound email is verified.
    #[serde(default)]
    pub email_verified: Option<bool>,
    /// Whether the account is active.
    #[serde(default)]
    pub is_active: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Forgot-password request body.
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    /// Username.
    pub username: String,
}

/// Reset-password request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// Reset token from the emailed link.
    pub token: String,
    /// New password.
    pub new_password: String,
}

/// Bind-email request body.
#[derive(Debug, Clone, Serialize)]
pub struct BindEmailRequest {
    /// Email address.
    pub email: String,
}

/// Verify-email request body.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyEmailRequest {
    /// Email address.
    pub email: String,
    /// Verification code.
    pub code: String,
}

/// Generic success acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// Success flag.
    #[serde(default)]
    pub success: Option<bool>,
    /// Message.
    #[serde(default)]
    pub message: Option<String>,
}
