//! Per-request access decision for administrative routes.

use crate::auth::{path_component, PathClass, PathPolicy, TokenCodec};

/// Default login page that denied requests are sent to.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Query parameter carrying the originally requested path.
pub const RETURN_PARAM: &str = "redirect";

/// Outcome of gating a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Let the request through. `subject` is set when a credential was verified.
    Allow { subject: Option<String> },
    /// Send the client to the login page.
    Redirect {
        target: String,
        param: &'static str,
        return_to: String,
    },
}

impl GateDecision {
    /// Redirect location, e.g. `/login?redirect=%2Fadmin`.
    pub fn location(&self) -> Option<String> {
        match self {
            GateDecision::Allow { .. } => None,
            GateDecision::Redirect {
                target,
                param,
                return_to,
            } => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair(param, return_to)
                    .finish();
                Some(format!("{}?{}", target, query))
            }
        }
    }
}

/// The gate: policy plus codec, fixed for the life of the process.
#[derive(Debug, Clone)]
pub struct AccessGate {
    enabled: bool,
    policy: PathPolicy,
    codec: TokenCodec,
    login_path: String,
}

impl AccessGate {
    /// Build a gate. The login path itself (not its subpaths) is always
    /// reachable without a credential.
    pub fn new(enabled: bool, mut policy: PathPolicy, codec: TokenCodec, login_path: &str) -> Self {
        let login_path = if login_path.is_empty() {
            DEFAULT_LOGIN_PATH.to_string()
        } else {
            login_path.to_string()
        };
        policy.add_always_allowed_exact(login_path.clone());

        Self {
            enabled,
            policy,
            codec,
            login_path,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn classify(&self, target: &str) -> PathClass {
        self.policy.classify(target)
    }

    /// Decide whether a request to `target` may proceed at time `now`.
    ///
    /// A missing credential and a rejected one produce the same redirect; the
    /// rejection reason is only logged.
    pub fn decide(&self, target: &str, credential: Option<&str>, now: i64) -> GateDecision {
        if !self.enabled {
            return GateDecision::Allow { subject: None };
        }

        match self.classify(target) {
            PathClass::AlwaysAllowed | PathClass::PubliclyAllowed => {
                GateDecision::Allow { subject: None }
            }
            PathClass::Protected => {
                let path = path_component(target);
                let Some(token) = credential else {
                    tracing::debug!(path = %path, "No credential for protected path");
                    return self.redirect(path);
                };

                match self.codec.verify(token, now) {
                    Ok(claims) => GateDecision::Allow {
                        subject: Some(claims.subject),
                    },
                    Err(e) => {
                        tracing::debug!(
                            path = %path,
                            reason = e.kind(),
                            "Credential rejected"
                        );
                        self.redirect(path)
                    }
                }
            }
        }
    }

    fn redirect(&self, path: &str) -> GateDecision {
        GateDecision::Redirect {
            target: self.login_path.clone(),
            param: RETURN_PARAM,
            return_to: path.to_string(),
        }
    }
}
