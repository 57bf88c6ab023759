//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`. The paths used by the bundled browser UI
//! (`/api/chats`, `/api/chat`) are kept as aliases.
//! Middleware: CORS, tracing.
//!
//! Static UI assets are served from `web_dir` when the directory exists. API
//! routes and `/health` take priority.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Conversations
        .route(
            "/conversations",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::save_conversation),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        // Completions
        .route("/completions", post(handlers::completion::create_completion))
        // Admin
        .route(
            "/admin/apikey",
            get(handlers::admin::get_api_key_status).post(handlers::admin::set_api_key),
        )
        // Browser UI paths
        .route(
            "/chats",
            get(handlers::conversation::list_conversations)
                .post(handlers::conversation::save_conversation),
        )
        .route("/chats/{id}", delete(handlers::conversation::delete_conversation))
        .route("/chat", post(handlers::completion::create_completion));

    let web_dir = state.web_dir.clone();

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if web_dir.is_dir() {
        router = router.fallback_service(ServeDir::new(&web_dir));
        tracing::info!(path = %web_dir.display(), "static file serving enabled");
    }

    router
}

/// GET /health - no auth required.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "conversations": state.chat_gateway.conversation_count().await,
    }))
}
