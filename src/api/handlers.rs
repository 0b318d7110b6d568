//! HTTP request handlers.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, Uri},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};

use crate::api::types::*;
use crate::auth::AuthenticatedSubject;
use crate::error::{GateError, GateResult};
use crate::AppState;

/// Cookie transport settings for the credential.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl CookieSettings {
    /// `Set-Cookie` value carrying a credential.
    pub fn session_cookie(&self, token: &str) -> String {
        self.render(token, self.max_age_secs)
    }

    /// `Set-Cookie` value that expires the credential immediately.
    pub fn clearing_cookie(&self) -> String {
        self.render("", 0)
    }

    fn render(&self, value: &str, max_age: i64) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Log in with the admin credential and receive a signed token.
///
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing fields or gate disabled"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Signing secret not configured")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> GateResult<impl IntoResponse> {
    if !state.gate.is_enabled() {
        return Err(GateError::BadRequest(
            "Authentication is not enabled".to_string(),
        ));
    }

    if request.username.is_empty() || request.password.is_empty() {
        return Err(GateError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    if !state
        .credentials
        .authenticate(&request.username, &request.password)
    {
        tracing::warn!(username = %request.username, "Failed login attempt");
        return Err(GateError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let token = state
        .gate
        .codec()
        .issue(&request.username, now, state.cookie.max_age_secs)?;

    tracing::info!(username = %request.username, "Admin logged in");

    let cookie = state.cookie.session_cookie(&token);
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            success: true,
            token,
            expires_in: state.cookie.max_age_secs,
        }),
    ))
}

/// Clear the credential cookie.
///
/// POST /api/auth/logout
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, state.cookie.clearing_cookie())]),
        Json(LogoutResponse { success: true }),
    )
}

/// Report the verified subject of the current request.
///
/// GET /admin/session
#[utoipa::path(
    get,
    path = "/admin/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 307, description = "Not authenticated, redirected to login")
    ),
    security(("cookie_auth" = [])),
    tag = "auth"
)]
pub async fn session(subject: Option<Extension<AuthenticatedSubject>>) -> Json<SessionResponse> {
    let subject = subject.map(|Extension(AuthenticatedSubject(s))| s);
    Json(SessionResponse {
        authenticated: subject.is_some(),
        subject,
    })
}

/// Health check endpoint.
///
/// GET /v1/health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        auth_enabled: state.gate.is_enabled(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> GateError {
    GateError::NotFound(uri.path().to_string())
}
