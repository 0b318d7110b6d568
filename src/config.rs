//! Configuration module for the admin gate.
//!
//! Loads configuration from YAML files and environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::{AccessGate, AdminCredentials, PathPolicy, TokenCodec, DEFAULT_LOGIN_PATH};

/// Prefix of environment overrides, e.g. `GATE__AUTH__SECRET`.
pub const ENV_PREFIX: &str = "GATE";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub filter: String,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            filter: "admin_gate=info,tower_http=info".to_string(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Gate and credential configuration.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Master switch for the gate. Off means every request is allowed.
    pub enabled: bool,
    /// Shared HMAC secret. Unset or empty means tokens can be neither issued nor verified.
    pub secret: Option<String>,
    /// Extra protected prefixes, comma separated.
    pub protected_paths: String,
    /// Admin username accepted at login.
    pub username: Option<String>,
    /// Admin password accepted at login.
    pub password: Option<String>,
    /// Credential lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Cookie carrying the credential.
    pub cookie_name: String,
    /// Add the `Secure` attribute to the cookie.
    pub secure_cookie: bool,
    /// Where denied requests are redirected.
    pub login_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: None,
            protected_paths: String::new(),
            username: None,
            password: None,
            token_ttl_secs: 86_400,
            cookie_name: "admin_gate_auth".to_string(),
            secure_cookie: false,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

// Keeps secrets out of logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("protected_paths", &self.protected_paths)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("cookie_name", &self.cookie_name)
            .field("secure_cookie", &self.secure_cookie)
            .field("login_path", &self.login_path)
            .finish()
    }
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (GATE__*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml (if exists)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with a given environment source.
    ///
    /// Environment values stay strings until deserialized into their field
    /// type, so secrets like `007` are kept verbatim. Booleans and numbers
    /// are still converted from their string form.
    fn load_with(env: Environment) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(env.separator("__").try_parsing(false))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }
}

impl AuthConfig {
    /// Reject settings the gate cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_ttl_secs <= 0 {
            return Err(ConfigError::Message(format!(
                "auth.token_ttl_secs must be positive, got {}",
                self.token_ttl_secs
            )));
        }
        if self.cookie_name.is_empty() {
            return Err(ConfigError::Message("auth.cookie_name must not be empty".to_string()));
        }
        if !self.login_path.is_empty() && !self.login_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "auth.login_path must start with '/', got {:?}",
                self.login_path
            )));
        }
        if self.login_path == "/" {
            return Err(ConfigError::Message(
                "auth.login_path must not be the site root".to_string(),
            ));
        }
        if self.path_policy().is_protected(&self.login_path) {
            return Err(ConfigError::Message(format!(
                "auth.login_path {:?} lies under a protected prefix",
                self.login_path
            )));
        }
        Ok(())
    }

    pub fn token_codec(&self) -> TokenCodec {
        TokenCodec::new(self.secret.as_deref())
    }

    pub fn path_policy(&self) -> PathPolicy {
        PathPolicy::with_custom_protected(&self.protected_paths)
    }

    pub fn access_gate(&self) -> AccessGate {
        AccessGate::new(
            self.enabled,
            self.path_policy(),
            self.token_codec(),
            &self.login_path,
        )
    }

    pub fn admin_credentials(&self) -> AdminCredentials {
        AdminCredentials::new(self.username.as_deref(), self.password.as_deref())
    }
}
