use std::{sync::Arc, time::Instant};

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unscramble_backend::{
    build_router, config::Config, words::WordList, AppState, SESSION_CLEANUP_INTERVAL,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unscramble_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Unscramble backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Load word list
    let words = match &config.game.word_list_path {
        Some(path) => match WordList::load(path).await {
            Ok(words) => Arc::new(words),
            Err(e) => {
                tracing::warn!("Failed to load word list: {:#}. Using built-in words.", e);
                WordList::builtin()
            }
        },
        None => WordList::builtin(),
    };
    tracing::info!("Playing with {} words", words.len());

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), words));

    // Spawn background task to clean up idle sessions
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        session_cleanup_task(cleanup_state).await;
    });

    let app = build_router(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("WebSocket endpoint: ws://{}/ws", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Background task that periodically removes idle sessions
async fn session_cleanup_task(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);

    loop {
        interval.tick().await;

        let removed = state.remove_idle_sessions(Instant::now());
        if removed > 0 {
            tracing::debug!(
                "Session cleanup removed {} sessions, {} remain",
                removed,
                state.sessions.len()
            );
        }
    }
}

