use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::models::{GameSnapshot, GuessOutcome};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    SubmitGuess {
        guess: String,
    },
    SkipWord,
    ResetGame,
    GetState,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// First message on every connection
    Session {
        session_id: Uuid,
        state: GameSnapshot,
    },
    GameState {
        state: GameSnapshot,
    },
    GuessResult {
        outcome: GuessOutcome,
        state: GameSnapshot,
    },
    /// Sent once the last round has been played
    GameOver {
        score: u32,
        state: GameSnapshot,
    },
    Error {
        message: String,
    },
}
