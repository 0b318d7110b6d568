//! Route definitions for the API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::auth::{enforce_gate, GateState};
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("admin_gate_auth"))),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login,
        handlers::logout,
        handlers::session,
        handlers::health_check,
    ),
    components(schemas(
        crate::api::types::LoginRequest,
        crate::api::types::LoginResponse,
        crate::api::types::LogoutResponse,
        crate::api::types::SessionResponse,
        crate::api::types::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Admin login and session endpoints"),
        (name = "health", description = "Health and status endpoints")
    ),
    info(
        title = "Admin Gate API",
        version = "0.1.0",
        description = "Stateless signed-cookie gate for administrative routes",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router with every route behind the gate.
///
/// When the gate is disabled the middleware still runs but allows everything.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let gate_state = GateState {
        gate: state.gate.clone(),
        cookie_name: state.cookie.name.as_str().into(),
    };

    Router::new()
        // Auth
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/admin/session", get(handlers::session))
        // Health
        .route("/v1/health", get(handlers::health_check))
        .fallback(handlers::not_found)
        .with_state(state)
        // OpenAPI docs
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(middleware::from_fn_with_state(gate_state, enforce_gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{
            header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
            Method, Request, StatusCode,
        },
        response::Response,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    use crate::api::types::{HealthResponse, LoginResponse, SessionResponse};
    use crate::config::AuthConfig;

    fn auth_config(enabled: bool) -> AuthConfig {
        AuthConfig {
            enabled,
            secret: Some("s3cr3t".to_string()),
            protected_paths: "/ops".to_string(),
            username: Some("admin".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    fn app(config: &AuthConfig) -> Router {
        crate::logging::init_test();
        build_router(AppState::from_config(config))
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn login_request(username: &str, password: &str) -> Request<Body> {
        let body = serde_json::json!({ "username": username, "password": password });
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers().get(LOCATION).unwrap().to_str().unwrap()
    }

    async fn login_token(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(login_request("admin", "hunter2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: LoginResponse = json(response).await;
        body.token
    }

    #[tokio::test]
    async fn test_protected_route_redirects_without_cookie() {
        let app = app(&auth_config(true));

        let response = app.oneshot(get("/admin/session?tab=1", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login?redirect=%2Fadmin%2Fsession");
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_unlocks_admin() {
        let app = app(&auth_config(true));

        let response = app
            .clone()
            .oneshot(login_request("admin", "hunter2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("admin_gate_auth="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
        assert!(set_cookie.contains("Max-Age=86400"));

        let body: LoginResponse = json(response).await;
        assert!(body.success);
        assert_eq!(body.expires_in, 86_400);

        let cookie = format!("theme=dark; admin_gate_auth={}", body.token);
        let response = app.oneshot(get("/admin/session", Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session: SessionResponse = json(response).await;
        assert!(session.authenticated);
        assert_eq!(session.subject.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_tampered_cookie_redirects() {
        let app = app(&auth_config(true));
        let token = login_token(&app).await;
        let tampered = format!("admin_gate_auth={}x", token);

        let response = app.oneshot(get("/settings", Some(&tampered))).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "/login?redirect=%2Fsettings");
    }

    #[tokio::test]
    async fn test_custom_protected_prefix() {
        let app = app(&auth_config(true));
        let token = login_token(&app).await;

        let response = app.clone().oneshot(get("/ops/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

        // Passes the gate, then hits the fallback
        let cookie = format!("admin_gate_auth={}", token);
        let response = app
            .clone()
            .oneshot(get("/ops/status", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/ops-public", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = app(&auth_config(true));
        let response = app.oneshot(login_request("admin", "nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_fields_is_bad_request() {
        let app = app(&auth_config(true));
        let response = app.oneshot(login_request("admin", "")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_without_secret_fails_closed() {
        let config = AuthConfig {
            secret: None,
            ..auth_config(true)
        };
        let app = app(&config);

        let response = app.oneshot(login_request("admin", "hunter2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_disabled_gate() {
        let app = app(&auth_config(false));

        let response = app
            .clone()
            .oneshot(get("/admin/session", Some("admin_gate_auth=garbage")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let session: SessionResponse = json(response).await;
        assert!(!session.authenticated);

        let response = app.oneshot(login_request("admin", "hunter2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_clears_cookie() {
        let app = app(&auth_config(true));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/logout")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("admin_gate_auth=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app(&auth_config(true));
        let response = app.oneshot(get("/v1/health", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = json(response).await;
        assert!(health.auth_enabled);
        assert_eq!(health.status, "healthy");
    }
}
