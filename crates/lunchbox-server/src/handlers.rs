//! HTTP request handlers for the menu service.
//!
//! Implements the menu endpoint, the health check and the shared-token
//! middleware using axum.

use crate::error::{ErrorResponse, MenuError};
use crate::orchestrator::{MenuOrchestrator, MenuRequest};
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use lunchbox_domain::{Clock, MenuCache, MenuExtractor, MenuPayload, PageFetcher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{error, warn};

/// Header carrying the shared auth token
pub const AUTH_HEADER: &str = "auth_token";

/// Anything that can answer a menu request
///
/// Blocking; handlers call it from `spawn_blocking`.
pub trait MenuService: Send + Sync {
    /// Handle one request
    fn handle(&self, request: &MenuRequest) -> Result<MenuPayload, MenuError>;
}

impl<C, F, X, K> MenuService for MenuOrchestrator<C, F, X, K>
where
    C: MenuCache + Send + Sync,
    C::Error: Display,
    F: PageFetcher + Send + Sync,
    F::Error: Display,
    X: MenuExtractor + Send + Sync,
    X::Error: Display,
    K: Clock + Send + Sync,
{
    fn handle(&self, request: &MenuRequest) -> Result<MenuPayload, MenuError> {
        MenuOrchestrator::handle(self, request)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The request pipeline
    pub menus: Arc<dyn MenuService>,
    /// Expected `AUTH_TOKEN` header value; `None` disables the check
    pub auth_token: Option<Arc<str>>,
}

impl AppState {
    /// Create state around a menu service
    pub fn new(menus: Arc<dyn MenuService>, auth_token: Option<&str>) -> Self {
        Self {
            menus,
            auth_token: auth_token.map(Arc::from),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Service name
    pub service: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request pipeline failed
    Menu(MenuError),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Menu(e) => e.into_response(),
            AppError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(msg))).into_response()
            }
        }
    }
}

impl From<MenuError> for AppError {
    fn from(e: MenuError) -> Self {
        AppError::Menu(e)
    }
}

/// POST /api/menu - Extract (or recall) the menu for a page and day
///
/// A missing or unparseable body reads as `{}`.
async fn menu(State(state): State<AppState>, body: Bytes) -> Result<Json<MenuPayload>, AppError> {
    let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let request = MenuRequest::from_json(&json);

    let menus = Arc::clone(&state.menus);
    let result = tokio::task::spawn_blocking(move || menus.handle(&request))
        .await
        .map_err(|e| {
            error!("Menu task failed: {}", e);
            AppError::InternalError(format!("Menu task failed: {}", e))
        })?;

    match result {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => {
            warn!("Menu request failed ({}): {}", e.status(), e);
            Err(e.into())
        }
    }
}

/// GET /api/health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
        service: "restaurant-menu-summarizer".to_string(),
    })
}

/// Reject `/api/*` requests that lack the configured token
async fn require_auth_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = state.auth_token.as_deref() {
        if request.uri().path().starts_with("/api/") {
            let given = request
                .headers()
                .get(AUTH_HEADER)
                .and_then(|value| value.to_str().ok());

            if given != Some(expected) {
                warn!("Rejected {} {}: bad or missing auth token", request.method(), request.uri().path());
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new("Invalid or missing AUTH_TOKEN")),
                )
                    .into_response();
            }
        }
    }

    next.run(request).await
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/api/menu", post(menu))
        .route("/api/health", get(health_check))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth_token))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use lunchbox_domain::MenuResponse;
    use tower::ServiceExt; // for oneshot

    struct Echo;

    impl MenuService for Echo {
        fn handle(&self, request: &MenuRequest) -> Result<MenuPayload, MenuError> {
            let url = request.url.clone().ok_or(MenuError::MissingUrl)?;
            let date = chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
            Ok(MenuPayload::fresh(MenuResponse::empty(url, date)))
        }
    }

    fn create_test_state(token: Option<&str>) -> AppState {
        AppState::new(Arc::new(Echo), token)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(None));

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_menu_without_body_is_missing_url() {
        let app = create_router(create_test_state(None));

        let request = Request::builder()
            .method("POST")
            .uri("/api/menu")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_auth_token_required_when_configured() {
        let app = create_router(create_test_state(Some("s3cret")));

        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_token_accepted() {
        let app = create_router(create_test_state(Some("s3cret")));

        let request = Request::builder()
            .uri("/api/health")
            .header("AUTH_TOKEN", "s3cret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
