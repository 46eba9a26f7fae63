use crate::{
    models::{GameSnapshot, GuessOutcome, SessionInfo},
    session::SessionError,
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct GuessRequest {
    pub guess: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GuessResponse {
    pub outcome: GuessOutcome,
    pub state: GameSnapshot,
}

fn session_status(e: SessionError) -> StatusCode {
    match e {
        SessionError::NotFound(session_id) => {
            tracing::debug!("Unknown session {}", session_id);
            StatusCode::NOT_FOUND
        }
        SessionError::TooManySessions(limit) => {
            tracing::warn!("Session limit of {} reached", limit);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Start a new game session
pub async fn create_game(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionInfo>), StatusCode> {
    let info = state.create_session().map_err(session_status)?;
    Ok((StatusCode::CREATED, Json(info)))
}

/// Current state of a game
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameSnapshot>, StatusCode> {
    let snapshot = state
        .with_session(session_id, |engine| engine.snapshot())
        .map_err(session_status)?;
    Ok(Json(snapshot))
}

/// Check a guess against the current word
pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GuessResponse>, StatusCode> {
    let response = state
        .with_session(session_id, |engine| {
            let outcome = engine.submit_guess(&payload.guess);
            GuessResponse {
                outcome,
                state: engine.snapshot(),
            }
        })
        .map_err(session_status)?;

    tracing::debug!("Session {} guessed: {:?}", session_id, response.outcome);

    Ok(Json(response))
}

/// Skip the current word
pub async fn skip_word(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameSnapshot>, StatusCode> {
    let snapshot = state
        .with_session(session_id, |engine| {
            engine.skip_word();
            engine.snapshot()
        })
        .map_err(session_status)?;
    Ok(Json(snapshot))
}

/// Start the game over from round 1
pub async fn reset_game(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<GameSnapshot>, StatusCode> {
    let snapshot = state
        .with_session(session_id, |engine| {
            engine.reset_game();
            engine.snapshot()
        })
        .map_err(session_status)?;

    tracing::info!("Session {} reset its game", session_id);

    Ok(Json(snapshot))
}

/// End a game session
pub async fn end_game(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    state.end_session(session_id).map_err(session_status)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request},
        Router,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    async fn call(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
        serde_json::from_slice(bytes).unwrap()
    }

    #[tokio::test]
    async fn test_full_game_over_http() {
        let state = test_state(&["swift", "horse"]);
        let app = build_router(state.clone());

        let (status, body) = call(&app, Method::POST, "/api/games", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let info: SessionInfo = parse(&body);
        assert_eq!(info.state.round, 1);
        assert_eq!(info.state.total_rounds, 2);
        let base = format!("/api/games/{}", info.session_id);

        let answer = tokio_test::assert_ok!(state.with_session(info.session_id, |engine| {
            engine.current_answer().map(str::to_string)
        }))
        .unwrap();

        let (status, body) = call(
            &app,
            Method::POST,
            &format!("{}/guess", base),
            Some(&format!(r#"{{"guess":"{}"}}"#, answer)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let guessed: GuessResponse = parse(&body);
        assert_eq!(guessed.outcome, GuessOutcome::Correct);
        assert_eq!(guessed.state.score, 20);
        assert_eq!(guessed.state.round, 2);

        let (_, body) = call(
            &app,
            Method::POST,
            &format!("{}/guess", base),
            Some(r#"{"guess":"nope"}"#),
        )
        .await;
        let wrong: GuessResponse = parse(&body);
        assert_eq!(wrong.outcome, GuessOutcome::Incorrect);
        assert!(wrong.state.is_guess_wrong);
        assert_eq!(wrong.state.score, 20);

        let (status, body) = call(&app, Method::POST, &format!("{}/skip", base), None).await;
        assert_eq!(status, StatusCode::OK);
        let finished: GameSnapshot = parse(&body);
        assert_eq!(finished.round, 3);
        assert!(finished.is_game_over);
        assert_eq!(finished.scrambled_word, None);

        let (_, body) = call(&app, Method::POST, &format!("{}/reset", base), None).await;
        let reset: GameSnapshot = parse(&body);
        assert_eq!(reset.round, 1);
        assert_eq!(reset.score, 0);
        assert!(!reset.is_game_over);

        let (status, body) = call(&app, Method::GET, &base, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse::<GameSnapshot>(&body), reset);
    }

    #[tokio::test]
    async fn test_end_game_removes_session() {
        let state = test_state(&["swift", "horse"]);
        let app = build_router(state.clone());
        let info = state.create_session().unwrap();
        let base = format!("/api/games/{}", info.session_id);

        let (status, _) = call(&app, Method::DELETE, &base, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.sessions.is_empty());

        let (status, _) = call(&app, Method::GET, &base, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::DELETE, &base, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_sessions() {
        let app = build_router(test_state(&["swift", "horse"]));

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/games/{}/skip", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, Method::GET, "/api/games/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_limit() {
        let state = test_state(&["swift", "horse"]);
        let app = build_router(state.clone());
        for _ in 0..state.config.game.max_sessions {
            state.create_session().unwrap();
        }

        let (status, _) = call(&app, Method::POST, "/api/games", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(&["swift", "horse"]));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = parse(&body);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "unscramble-backend");
    }
}
