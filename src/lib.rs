pub mod config;
pub mod game;
pub mod models;
pub mod routes;
pub mod session;
pub mod utils;
pub mod websocket;
pub mod words;

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::{routing::get, Router};
use chrono::{DateTime, Utc};
use config::Config;
use dashmap::DashMap;
use game::GameEngine;
use models::SessionInfo;
use rand::{rngs::StdRng, SeedableRng};
use session::SessionError;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;
use words::WordList;

/// How often idle sessions are looked for
pub const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(15);

/// One player's game, kept in memory between requests
pub struct GameSession {
    pub session_id: Uuid,
    pub engine: GameEngine,
    pub created_at: DateTime<Utc>,
    pub last_activity: Instant,
}

impl GameSession {
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id,
            created_at: self.created_at,
            state: self.engine.snapshot(),
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    pub config: Config,
    pub words: Arc<WordList>,
    pub sessions: DashMap<Uuid, GameSession>,
    /// Held while checking the session limit and inserting, so concurrent
    /// creations cannot overshoot it
    creating: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config, words: Arc<WordList>) -> Self {
        Self {
            config,
            words,
            sessions: DashMap::new(),
            creating: Mutex::new(()),
        }
    }

    /// Start a new game in its own session
    pub fn create_session(&self) -> Result<SessionInfo, SessionError> {
        let limit = self.config.game.max_sessions;
        let _creating = self.creating.lock().unwrap_or_else(PoisonError::into_inner);
        if self.sessions.len() >= limit {
            return Err(SessionError::TooManySessions(limit));
        }

        let session_id = Uuid::new_v4();
        let session = GameSession {
            session_id,
            engine: GameEngine::new(
                self.words.clone(),
                self.config.game.rules(),
                StdRng::from_os_rng(),
            ),
            created_at: Utc::now(),
            last_activity: Instant::now(),
        };
        let info = session.info();
        self.sessions.insert(session_id, session);

        tracing::info!("Created session {}", session_id);

        Ok(info)
    }

    /// Run `f` against a session's game while holding that session's entry.
    /// Counts as activity for idle cleanup.
    pub fn with_session<T>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut GameEngine) -> T,
    ) -> Result<T, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        session.last_activity = Instant::now();
        Ok(f(&mut session.engine))
    }

    pub fn end_session(&self, session_id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        tracing::info!("Ended session {}", session_id);
        Ok(())
    }

    /// Drop sessions with no activity for longer than the idle timeout.
    /// Returns how many were removed.
    pub fn remove_idle_sessions(&self, now: Instant) -> usize {
        let timeout = self.config.game.session_idle_timeout();
        let before = self.sessions.len();

        self.sessions.retain(|session_id, session| {
            let idle = now.saturating_duration_since(session.last_activity);
            if idle > timeout {
                tracing::info!(
                    "Removed idle session {} (inactive for {}s)",
                    session_id,
                    idle.as_secs()
                );
                false
            } else {
                true
            }
        });

        before.saturating_sub(self.sessions.len())
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(websocket::handle_websocket))
        // API routes
        .merge(routes::create_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Shared state over a small word list, for handler tests
#[cfg(test)]
pub(crate) fn test_state(words: &[&str]) -> Arc<AppState> {
    let mut config = Config::default();
    config.game.max_sessions = 4;
    let words = WordList::new(words.iter().copied()).unwrap();
    Arc::new(AppState::new(config, Arc::new(words)))
}
