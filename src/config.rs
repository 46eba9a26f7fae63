use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::game::{
    engine::DEFAULT_SCORE_INCREMENT, scrambler::DEFAULT_MAX_ATTEMPTS, GameRules,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// Word list file; the built-in pool is used when unset
    pub word_list_path: Option<String>,
    pub rounds_per_game: Option<usize>,
    pub score_increment: u32,
    pub max_scramble_attempts: usize,
    pub guess_case_sensitive: bool,
    pub session_idle_timeout_secs: u64,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            game: GameConfig {
                word_list_path: None,
                rounds_per_game: None,
                score_increment: DEFAULT_SCORE_INCREMENT,
                max_scramble_attempts: DEFAULT_MAX_ATTEMPTS,
                guess_case_sensitive: false,
                session_idle_timeout_secs: 1800,
                max_sessions: 10_000,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from a variable lookup, falling back to defaults for unset keys
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            host: var("HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
        };

        let rounds_per_game = match var("ROUNDS_PER_GAME") {
            Some(value) => Some(
                value
                    .parse::<usize>()
                    .context("ROUNDS_PER_GAME must be a number")?,
            ),
            None => None,
        };
        ensure!(
            rounds_per_game != Some(0),
            "ROUNDS_PER_GAME must be at least 1"
        );

        let game = GameConfig {
            word_list_path: var("WORD_LIST_PATH"),
            rounds_per_game,
            score_increment: var("SCORE_INCREMENT")
                .unwrap_or_else(|| DEFAULT_SCORE_INCREMENT.to_string())
                .parse()
                .context("SCORE_INCREMENT must be a number")?,
            max_scramble_attempts: var("MAX_SCRAMBLE_ATTEMPTS")
                .unwrap_or_else(|| DEFAULT_MAX_ATTEMPTS.to_string())
                .parse()
                .context("MAX_SCRAMBLE_ATTEMPTS must be a number")?,
            guess_case_sensitive: var("GUESS_CASE_SENSITIVE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .context("GUESS_CASE_SENSITIVE must be true or false")?,
            session_idle_timeout_secs: var("SESSION_IDLE_TIMEOUT_SECS")
                .unwrap_or_else(|| "1800".to_string())
                .parse()
                .context("SESSION_IDLE_TIMEOUT_SECS must be a number")?,
            max_sessions: var("MAX_SESSIONS")
                .unwrap_or_else(|| "10000".to_string())
                .parse()
                .context("MAX_SESSIONS must be a number")?,
        };

        Ok(Config { server, game })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GameConfig {
    /// Rules every new game is started with
    pub fn rules(&self) -> GameRules {
        GameRules {
            rounds: self.rounds_per_game,
            score_increment: self.score_increment,
            max_scramble_attempts: self.max_scramble_attempts,
            case_sensitive: self.guess_case_sensitive,
        }
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }
}
