use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of checking a guess against the current word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct,
    Incorrect,
}

/// Read-only view of a game, everything a client needs to render it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Scrambled word for the current round; absent once the game is over
    pub scrambled_word: Option<String>,
    /// 1-based round index
    pub round: usize,
    pub total_rounds: usize,
    pub score: u32,
    pub is_guess_wrong: bool,
    pub is_game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: GameSnapshot,
}
