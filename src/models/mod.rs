pub mod game;

pub use game::{GameSnapshot, GuessOutcome, SessionInfo};
