// src/main.rs

use std::sync::Arc;

use dotenvy::dotenv;
use mathprep::bank::{JsonQuestionBank, QuestionBank};
use mathprep::config::Config;
use mathprep::engine::{InMemorySessionStore, QuizEngine, SessionStore, spawn_reaper};
use mathprep::routes;
use mathprep::state::AppState;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Config is read before the subscriber exists, so its warnings are replayed here.
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    if !config.bank_dir.is_dir() {
        tracing::warn!(
            "Question bank directory {} does not exist; every quiz start will fail",
            config.bank_dir.display()
        );
    }

    let bank: Arc<dyn QuestionBank> = Arc::new(JsonQuestionBank::new(&config.bank_dir));
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let engine = Arc::new(QuizEngine::new(bank, store.clone(), config.quiz.clone()));

    // Idle-session reaper
    spawn_reaper(store, config.session_ttl, config.reaper_interval);
    tracing::info!(
        "Session TTL {}s, reaping every {}s",
        config.session_ttl.as_secs(),
        config.reaper_interval.as_secs()
    );

    // Create AppState
    let addr = config.bind_addr;
    let state = AppState { engine, config };

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Start the server
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
