pub mod admin;
pub mod applications;
pub mod calendar;
pub mod events;
pub mod invites;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::CONFIG;
use crate::db;
use crate::middleware::{require_auth, security_headers};
use crate::state::AppState;

/// Full application: API routes plus the HTTP layers
pub fn create_app(state: AppState) -> Router {
    create_router(state)
        .layer(axum_middleware::from_fn(security_headers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&CONFIG.server.allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/version", get(get_version))
        .with_state(state.clone())
        .merge(events::events_routes(state.clone()))
        .merge(invites::public_routes(state.clone()))
        .merge(calendar::calendar_routes());

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .merge(applications::applications_routes(state.clone()))
        .merge(invites::admin_routes(state.clone()))
        .merge(admin::admin_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    // Merge public and protected routes
    public_routes.merge(protected_routes)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database = db::is_reachable(&state.db).await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
        })),
    )
}

/// Version info endpoint
async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": CONFIG.version,
        "commit_hash": CONFIG.commit_hash,
        "build_time": CONFIG.build_time,
    }))
}
