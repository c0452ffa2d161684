use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

use crate::{handlers, ApiError, AppState};

/// Body served while the front-end bundle has not been built yet.
pub const INITIALIZING_MESSAGE: &str =
    "MEP Audit System is initializing. Please wait and refresh in 10 seconds.";

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/files", get(handlers::list_files))
        .route("/run-audit", post(handlers::run_audit))
        .route("/dashboard", post(handlers::dashboard))
        // LLM proxy
        .route("/ai-chat", post(handlers::ai_chat))
        .route("/vision-chat", post(handlers::vision_chat))
        .route("/reasoning", post(handlers::reasoning))
        .route("/health", get(handlers::health))
        // Persistence
        .route(
            "/comments",
            get(handlers::get_comments).post(handlers::save_comment),
        )
        .route(
            "/feedback",
            get(handlers::get_feedback).post(handlers::save_feedback),
        )
        .route("/git-history", get(handlers::git_history))
        .route("/history/cards", get(handlers::history_cards))
        // Standards and evidence
        .route("/standards", get(handlers::standards_tree))
        .route("/standards/search", get(handlers::standards_search))
        .route("/insights/{kind}", get(handlers::insight))
        .route("/search", post(handlers::search))
        .route("/rag-query", post(handlers::rag_query))
        .route("/admin/manuals", get(handlers::list_manuals))
        .route("/admin/reindex", post(handlers::reindex))
        .fallback(api_not_found);

    Router::new()
        .nest("/api", api)
        .fallback(spa_fallback)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("Unknown API endpoint".into())
}

/// Static bundle, then `index.html` for client-side routes, then the
/// initializing placeholder.
async fn spa_fallback(State(state): State<AppState>, request: Request<Body>) -> Response {
    let static_dir = state.settings.static_dir();
    let index = static_dir.join("index.html");

    let response = match ServeDir::new(&static_dir).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    if response.status() != StatusCode::NOT_FOUND {
        return response.into_response();
    }

    match tokio::fs::read_to_string(&index).await {
        Ok(body) => axum::response::Html(body).into_response(),
        Err(e) => {
            warn!(path = ?index, error = %e, "front-end bundle missing");
            (StatusCode::NOT_FOUND, INITIALIZING_MESSAGE).into_response()
        }
    }
}
