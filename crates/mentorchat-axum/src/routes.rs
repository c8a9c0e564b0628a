//! Route definitions and router construction.

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix (nested under `/api` by the caller).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tts",
            get(handlers::tts::status).post(handlers::tts::synthesize),
        )
        .route("/chat", post(handlers::chat::stream_chat))
}

/// Create the main Axum router.
///
/// 1. `/health` for liveness probes
/// 2. `/api/*` JSON and event-stream endpoints
/// 3. Everything else is served from the public directory, which is how
///    `/generated-audio/<file>.mp3` reaches the audio cache
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let public_dir = ctx.public_dir.clone();
    let state: AppState = Arc::new(ctx);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
pub(crate) async fn health_check() -> &'static str {
    "OK"
}
