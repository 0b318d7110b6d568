//! API request and response types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ==================== Authentication ====================

/// Login request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Admin username.
    #[serde(default)]
    pub username: String,
    /// Admin password.
    #[serde(default)]
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    /// Signed credential, also set as a cookie.
    pub token: String,
    /// Credential lifetime in seconds.
    pub expires_in: i64,
}

/// Logout response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Current session.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// Whether the request carried a verified credential.
    pub authenticated: bool,
    /// Verified subject, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

// ==================== Health ====================

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Whether the gate is enforcing.
    pub auth_enabled: bool,
    /// Timestamp.
    pub timestamp: String,
}
