pub mod games;
pub mod health;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", post(games::create_game))
        .route(
            "/games/{session_id}",
            get(games::get_game).delete(games::end_game),
        )
        .route("/games/{session_id}/guess", post(games::submit_guess))
        .route("/games/{session_id}/skip", post(games::skip_word))
        .route("/games/{session_id}/reset", post(games::reset_game))
}
