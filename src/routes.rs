// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{quiz, tutorials},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quiz, tutorials).
/// * Serves tutorial PDFs from the configured directory.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let quiz_routes = Router::new()
        .route("/start", post(quiz::start_quiz))
        .route("/answer", post(quiz::submit_answer))
        .route("/hint", get(quiz::get_hint))
        .route("/{session_id}", get(quiz::get_session));

    let tutorial_routes = Router::new().route("/", get(tutorials::list_tutorials));

    let pdfs = ServeDir::new(&state.config.tutorials_dir);

    Router::new()
        .route("/healthz", get(tutorials::healthz))
        .nest("/api/quiz", quiz_routes)
        .nest("/api/tutorials", tutorial_routes)
        .nest_service("/tutorials", pdfs)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// A lone `*` allows any origin. Otherwise `*` cannot be mixed into an
/// explicit list and is dropped along with unparsable entries.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow = if origins.len() == 1 && origins[0].trim() == "*" {
        AllowOrigin::any()
    } else {
        let list: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| {
                if origin.trim() == "*" {
                    tracing::warn!("Ignoring wildcard CORS origin mixed with explicit origins");
                    return None;
                }
                match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                        None
                    }
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(allow)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}
