// Game engine modules

pub mod engine;
pub mod scrambler;
pub mod validator;

pub use engine::{GameEngine, GameRules};
pub use scrambler::Scrambler;
pub use validator::GuessValidator;
