//! Gate middleware for axum.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{AccessGate, GateDecision};

/// Subject of a verified credential, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject(pub String);

/// State for [`enforce_gate`].
#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<AccessGate>,
    pub cookie_name: Arc<str>,
}

/// Find a cookie value across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// Run every request through the gate.
///
/// Allowed requests continue, carrying [`AuthenticatedSubject`] when a
/// credential was verified. Denied requests get a temporary redirect to login.
pub async fn enforce_gate(
    State(state): State<GateState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let now = chrono::Utc::now().timestamp();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let credential = cookie_value(request.headers(), &state.cookie_name);

    match state.gate.decide(&target, credential, now) {
        GateDecision::Allow { subject } => {
            if let Some(subject) = subject {
                request
                    .extensions_mut()
                    .insert(AuthenticatedSubject(subject));
            }
            next.run(request).await
        }
        decision @ GateDecision::Redirect { .. } => {
            let location = decision.location().unwrap_or_default();
            tracing::info!(path = %request.uri().path(), location = %location, "Redirecting to login");
            Redirect::temporary(&location).into_response()
        }
    }
}
