use crate::{
    session::{RequestedSession, SessionError},
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{
    sink::{Sink, SinkExt},
    stream::{Stream, StreamExt},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// WebSocket upgrade handler, optionally resuming an existing session
pub async fn handle_websocket(
    requested: RequestedSession,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, requested))
}

/// Handle individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, requested: RequestedSession) {
    let (session_id, opening) = match open_session(&state, requested) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!("Refusing WebSocket connection: {}", e);
            if let Ok(json) = serde_json::to_string(&ServerMessage::Error {
                message: e.to_string(),
            }) {
                let _ = socket.send(Message::Text(json.into())).await;
            }
            return;
        }
    };

    tracing::info!("WebSocket connection established for session {}", session_id);

    let (sender, receiver) = socket.split();
    run_connection(receiver, sender, state, session_id, opening).await;

    // The session outlives the connection so the client can resume it;
    // idle sessions are reaped by the cleanup task
    tracing::info!("WebSocket connection closed for session {}", session_id);
}

/// Pump one connection: client messages in, replies out.
///
/// When the receiving side stops, every reply already queued is still
/// delivered before the close frame.
async fn run_connection<St, Si, E>(
    receiver: St,
    sender: Si,
    state: Arc<AppState>,
    session_id: Uuid,
    opening: ServerMessage,
) where
    St: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    Si: Sink<Message> + Unpin + Send + 'static,
    E: Send + 'static,
{
    let (tx, rx) = mpsc::channel::<ServerMessage>(100);

    let _ = tx.send(opening).await;

    // Spawn a task to send messages to the client
    let mut send_task = tokio::spawn(forward_messages(rx, sender));

    // Handle incoming messages from the client
    let mut recv_task = tokio::spawn(receive_messages(receiver, state, session_id, tx));

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            // The sender was dropped with the receive task, so this drains and closes
            let _ = (&mut send_task).await;
        }
    }
}

/// Serialize queued replies onto the socket, then close it once the queue ends
async fn forward_messages<Si>(mut rx: mpsc::Receiver<ServerMessage>, mut sender: Si)
where
    Si: Sink<Message> + Unpin,
{
    while let Some(msg) = rx.recv().await {
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if sender.send(Message::Text(json.into())).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::error!("Failed to serialize message: {}", e);
            }
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}

/// Read client messages and queue the replies until the client leaves or the
/// session disappears
async fn receive_messages<St, E>(
    mut receiver: St,
    state: Arc<AppState>,
    session_id: Uuid,
    tx: mpsc::Sender<ServerMessage>,
) where
    St: Stream<Item = Result<Message, E>> + Unpin,
{
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => match handle_client_message(client_msg, &state, session_id) {
                    Ok(replies) => {
                        for reply in replies {
                            if tx.send(reply).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error handling message: {}", e);
                        let _ = tx
                            .send(ServerMessage::Error {
                                message: e.to_string(),
                            })
                            .await;
                        // The session is gone, nothing more can be played here
                        return;
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to parse message: {}", e);
                    let error_msg = ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = tx.send(error_msg).await;
                }
            },
            Message::Close(_) => {
                tracing::info!("Client disconnected from session {}", session_id);
                return;
            }
            _ => {}
        }
    }
}

/// Resume the requested session if it still exists, otherwise start a new one
fn open_session(
    state: &AppState,
    requested: RequestedSession,
) -> Result<(Uuid, ServerMessage), SessionError> {
    if let Some(session_id) = requested.0 {
        match state.with_session(session_id, |engine| engine.snapshot()) {
            Ok(snapshot) => {
                tracing::info!("Resuming session {}", session_id);
                return Ok((
                    session_id,
                    ServerMessage::Session {
                        session_id,
                        state: snapshot,
                    },
                ));
            }
            Err(e) => {
                tracing::warn!("Cannot resume: {}. Starting a new session", e);
            }
        }
    }

    let info = state.create_session()?;
    Ok((
        info.session_id,
        ServerMessage::Session {
            session_id: info.session_id,
            state: info.state,
        },
    ))
}

/// Apply a client message to its session's game and build the replies.
/// Runs synchronously so the session entry is never locked across an await.
fn handle_client_message(
    msg: ClientMessage,
    state: &AppState,
    session_id: Uuid,
) -> Result<Vec<ServerMessage>, SessionError> {
    state.with_session(session_id, |engine| {
        let was_over = engine.is_game_over();

        let mut replies = match msg {
            ClientMessage::SubmitGuess { guess } => {
                let outcome = engine.submit_guess(&guess);
                tracing::debug!("Session {} guessed: {:?}", session_id, outcome);
                vec![ServerMessage::GuessResult {
                    outcome,
                    state: engine.snapshot(),
                }]
            }
            ClientMessage::SkipWord => {
                engine.skip_word();
                tracing::debug!("Session {} skipped a word", session_id);
                vec![ServerMessage::GameState {
                    state: engine.snapshot(),
                }]
            }
            ClientMessage::ResetGame => {
                engine.reset_game();
                tracing::info!("Session {} reset its game", session_id);
                vec![ServerMessage::GameState {
                    state: engine.snapshot(),
                }]
            }
            ClientMessage::GetState => vec![ServerMessage::GameState {
                state: engine.snapshot(),
            }],
        };

        if !was_over && engine.is_game_over() {
            tracing::info!(
                "Session {} finished with score {}",
                session_id,
                engine.score()
            );
            replies.push(ServerMessage::GameOver {
                score: engine.score(),
                state: engine.snapshot(),
            });
        }

        replies
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::GuessOutcome, test_state};

    #[test]
    fn test_open_session_creates_new_session() {
        let state = test_state(&["swift", "horse"]);
        let (session_id, opening) = open_session(&state, RequestedSession(None)).unwrap();

        assert!(state.sessions.contains_key(&session_id));
        match opening {
            ServerMessage::Session { state: snapshot, .. } => {
                assert_eq!(snapshot.round, 1);
                assert!(snapshot.scrambled_word.is_some());
            }
            other => panic!("expected session message, got {:?}", other),
        }
    }

    #[test]
    fn test_open_session_resumes_existing() {
        let state = test_state(&["swift", "horse"]);
        let info = state.create_session().unwrap();
        state.with_session(info.session_id, |engine| engine.skip_word()).unwrap();

        let (session_id, opening) =
            open_session(&state, RequestedSession(Some(info.session_id))).unwrap();
        assert_eq!(session_id, info.session_id);
        assert_eq!(state.sessions.len(), 1);
        match opening {
            ServerMessage::Session { state: snapshot, .. } => assert_eq!(snapshot.round, 2),
            other => panic!("expected session message, got {:?}", other),
        }
    }

    #[test]
    fn test_open_session_unknown_id_starts_fresh() {
        let state = test_state(&["swift", "horse"]);
        let stale = Uuid::new_v4();
        let (session_id, _) = open_session(&state, RequestedSession(Some(stale))).unwrap();
        assert_ne!(session_id, stale);
        assert!(state.sessions.contains_key(&session_id));
    }

    #[test]
    fn test_guess_messages_until_game_over() {
        let state = test_state(&["swift", "horse"]);
        let session_id = state.create_session().unwrap().session_id;

        let wrong = handle_client_message(
            ClientMessage::SubmitGuess {
                guess: "nope".to_string(),
            },
            &state,
            session_id,
        )
        .unwrap();
        match wrong.as_slice() {
            [ServerMessage::GuessResult { outcome, state }] => {
                assert_eq!(*outcome, GuessOutcome::Incorrect);
                assert!(state.is_guess_wrong);
            }
            other => panic!("unexpected replies {:?}", other),
        }

        let answer = state
            .with_session(session_id, |engine| engine.current_answer().map(str::to_string))
            .unwrap()
            .unwrap();
        let right = handle_client_message(
            ClientMessage::SubmitGuess { guess: answer },
            &state,
            session_id,
        )
        .unwrap();
        match right.as_slice() {
            [ServerMessage::GuessResult { outcome, state }] => {
                assert_eq!(*outcome, GuessOutcome::Correct);
                assert_eq!(state.score, 20);
                assert_eq!(state.round, 2);
            }
            other => panic!("unexpected replies {:?}", other),
        }

        let skipped = handle_client_message(ClientMessage::SkipWord, &state, session_id).unwrap();
        match skipped.as_slice() {
            [ServerMessage::GameState { state }, ServerMessage::GameOver { score, .. }] => {
                assert!(state.is_game_over);
                assert_eq!(state.round, 3);
                assert_eq!(*score, 20);
            }
            other => panic!("unexpected replies {:?}", other),
        }

        // Game over is only announced once
        let again = handle_client_message(ClientMessage::SkipWord, &state, session_id).unwrap();
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_reset_message() {
        let state = test_state(&["swift", "horse"]);
        let session_id = state.create_session().unwrap().session_id;
        handle_client_message(ClientMessage::SkipWord, &state, session_id).unwrap();

        let replies = handle_client_message(ClientMessage::ResetGame, &state, session_id).unwrap();
        match replies.as_slice() {
            [ServerMessage::GameState { state }] => {
                assert_eq!(state.round, 1);
                assert_eq!(state.score, 0);
            }
            other => panic!("unexpected replies {:?}", other),
        }
    }

    #[test]
    fn test_unknown_session_is_an_error() {
        let state = test_state(&["swift", "horse"]);
        let missing = Uuid::new_v4();
        let result = handle_client_message(ClientMessage::GetState, &state, missing);
        assert_eq!(result.unwrap_err(), SessionError::NotFound(missing));
    }

    #[tokio::test]
    async fn test_removed_session_error_is_delivered_before_close() {
        let state = test_state(&["swift", "horse"]);
        let info = state.create_session().unwrap();
        let opening = ServerMessage::Session {
            session_id: info.session_id,
            state: info.state,
        };
        state.end_session(info.session_id).unwrap();

        let get_state = r#"{"type":"get_state"}"#;
        let incoming = futures::stream::iter(vec![
            Ok::<_, axum::Error>(Message::Text(get_state.into())),
            Ok(Message::Text(get_state.into())),
        ]);
        let (out_tx, out_rx) = futures::channel::mpsc::unbounded::<Message>();

        run_connection(incoming, out_tx, state.clone(), info.session_id, opening).await;

        let sent: Vec<Message> = out_rx.collect().await;
        let texts: Vec<ServerMessage> = sent
            .iter()
            .filter_map(|msg| match msg {
                Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
                _ => None,
            })
            .collect();

        assert_eq!(sent.len(), 3, "unexpected frames {:?}", sent);
        assert!(matches!(
            texts.as_slice(),
            [ServerMessage::Session { .. }, ServerMessage::Error { .. }]
        ));
        assert!(matches!(sent.last(), Some(Message::Close(None))));
    }

    #[tokio::test]
    async fn test_malformed_message_keeps_connection() {
        let state = test_state(&["swift", "horse"]);
        let info = state.create_session().unwrap();
        let opening = ServerMessage::Session {
            session_id: info.session_id,
            state: info.state,
        };

        let incoming = futures::stream::iter(vec![
            Ok::<_, axum::Error>(Message::Text("not json".into())),
            Ok(Message::Text(r#"{"type":"skip_word"}"#.into())),
        ]);
        let (out_tx, out_rx) = futures::channel::mpsc::unbounded::<Message>();

        run_connection(incoming, out_tx, state.clone(), info.session_id, opening).await;

        let sent: Vec<Message> = out_rx.collect().await;
        let texts: Vec<ServerMessage> = sent
            .iter()
            .filter_map(|msg| match msg {
                Message::Text(text) => serde_json::from_str(text.as_str()).ok(),
                _ => None,
            })
            .collect();

        match texts.as_slice() {
            [
                ServerMessage::Session { .. },
                ServerMessage::Error { message },
                ServerMessage::GameState { state },
            ] => {
                assert!(message.starts_with("Invalid message format"));
                assert_eq!(state.round, 2);
            }
            other => panic!("unexpected replies {:?}", other),
        }
        assert!(matches!(sent.last(), Some(Message::Close(None))));
    }

    #[test]
    fn test_client_message_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"submit_guess","guess":"swift"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SubmitGuess { guess } if guess == "swift"));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"skip_word"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::SkipWord));
    }
}
