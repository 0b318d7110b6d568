//! Admin Gate - stateless access control for administrative routes
//!
//! Every request is classified by path; protected paths require a signed,
//! time-bounded credential carried in a cookie.

use std::sync::Arc;

use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod error;
mod logging;

use crate::api::build_router;
use crate::api::handlers::CookieSettings;
use crate::auth::{AccessGate, AdminCredentials};
use crate::config::{AuthConfig, Config};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Gate policy and token codec.
    pub gate: Arc<AccessGate>,
    /// Admin credential accepted at login.
    pub credentials: AdminCredentials,
    /// Cookie transport for issued credentials.
    pub cookie: CookieSettings,
}

impl AppState {
    /// Build state from an auth configuration snapshot.
    pub fn from_config(auth: &AuthConfig) -> Self {
        Self {
            gate: Arc::new(auth.access_gate()),
            credentials: auth.admin_credentials(),
            cookie: CookieSettings {
                name: auth.cookie_name.clone(),
                max_age_secs: auth.token_ttl_secs,
                secure: auth.secure_cookie,
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    let loaded = Config::load();
    let logging_config = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    logging::init(&logging_config);

    tracing::info!("Starting Admin Gate v{}", env!("CARGO_PKG_VERSION"));

    let config = loaded.map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        auth_enabled = %config.auth.enabled,
        "Configuration loaded"
    );

    let state = AppState::from_config(&config.auth);

    if state.gate.is_enabled() {
        if !state.gate.codec().has_secret() {
            tracing::warn!("No signing secret configured - logins will fail and protected paths stay locked");
        }
        if !state.credentials.is_configured() {
            tracing::warn!("Admin username or password not configured - logins will fail");
        }
        tracing::info!(
            protected = ?state.gate.policy().protected(),
            always_allowed = ?state.gate.policy().always_allowed(),
            "Authentication enabled"
        );
    } else {
        tracing::warn!("Authentication is DISABLED - enable for production");
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
