use std::collections::HashSet;
use std::sync::Arc;

use rand::{rngs::StdRng, seq::IndexedRandom, Rng};

use crate::{
    game::{scrambler::DEFAULT_MAX_ATTEMPTS, GuessValidator, Scrambler},
    models::{GameSnapshot, GuessOutcome},
    words::WordList,
};

/// Points awarded for each correct guess unless configured otherwise
pub const DEFAULT_SCORE_INCREMENT: u32 = 20;

/// Tunable rules of a game
#[derive(Debug, Clone)]
pub struct GameRules {
    /// Cap on rounds per game. `None` plays through the whole word list.
    pub rounds: Option<usize>,
    pub score_increment: u32,
    pub max_scramble_attempts: usize,
    pub case_sensitive: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            rounds: None,
            score_increment: DEFAULT_SCORE_INCREMENT,
            max_scramble_attempts: DEFAULT_MAX_ATTEMPTS,
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CurrentWord {
    /// Index into the word list
    index: usize,
    scrambled: String,
}

/// Mutable state of one game, replaced wholesale on reset
#[derive(Debug, Clone)]
pub struct GameState {
    current: Option<CurrentWord>,
    current_word_count: usize,
    score: u32,
    is_guess_wrong: bool,
    is_game_over: bool,
    /// Indices of words already presented, excluding the current one
    used_words: HashSet<usize>,
}

impl GameState {
    fn new() -> Self {
        Self {
            current: None,
            current_word_count: 1,
            score: 0,
            is_guess_wrong: false,
            is_game_over: false,
            used_words: HashSet::new(),
        }
    }
}

/// Owns a game's state and enforces the round transitions:
/// a correct guess or a skip advances, a wrong guess only raises the flag,
/// and the game ends once every round has been played.
pub struct GameEngine<R: Rng = StdRng> {
    words: Arc<WordList>,
    rules: GameRules,
    scrambler: Scrambler,
    validator: GuessValidator,
    rng: R,
    state: GameState,
}

impl<R: Rng> GameEngine<R> {
    /// Start a new game at round 1 with a freshly scrambled first word
    pub fn new(words: Arc<WordList>, rules: GameRules, rng: R) -> Self {
        let mut engine = Self {
            words,
            scrambler: Scrambler::new(rules.max_scramble_attempts, rules.case_sensitive),
            validator: GuessValidator::new(rules.case_sensitive),
            rules,
            rng,
            state: GameState::new(),
        };
        engine.pick_next_scrambled_word();
        engine
    }

    /// Number of rounds in a game: the word list size, or the configured cap if smaller
    pub fn total_rounds(&self) -> usize {
        let available = self.words.len();
        self.rules
            .rounds
            .map_or(available, |rounds| rounds.clamp(1, available))
    }

    /// Draw an unused word and scramble it as the current round.
    ///
    /// Ends the game and returns `None` once the round counter has passed the
    /// last round or no unused word remains.
    fn pick_next_scrambled_word(&mut self) -> Option<String> {
        if self.state.current_word_count > self.total_rounds() {
            self.finish();
            return None;
        }

        let candidates: Vec<usize> = (0..self.words.len())
            .filter(|idx| !self.state.used_words.contains(idx))
            .collect();

        let Some(&index) = candidates.choose(&mut self.rng) else {
            self.finish();
            return None;
        };

        let Some(scrambled) = self.scrambler.scramble(&self.words[index], &mut self.rng) else {
            // Word lists reject words without a distinct rearrangement
            tracing::error!("Word '{}' cannot be scrambled", &self.words[index]);
            self.finish();
            return None;
        };

        tracing::debug!(
            "Round {}/{}: presenting '{}'",
            self.state.current_word_count,
            self.total_rounds(),
            scrambled
        );

        self.state.current = Some(CurrentWord {
            index,
            scrambled: scrambled.clone(),
        });
        Some(scrambled)
    }

    /// Check a guess against the current word.
    ///
    /// A correct guess scores and advances; an incorrect one only raises the
    /// wrong-guess flag so the player can retry. Guesses after the game is over
    /// are ignored and reported as incorrect.
    pub fn submit_guess(&mut self, guess: &str) -> GuessOutcome {
        let Some(current) = &self.state.current else {
            tracing::debug!("Ignoring guess, game is over");
            return GuessOutcome::Incorrect;
        };

        if self.validator.is_correct(guess, &self.words[current.index]) {
            self.state.score = self.state.score.saturating_add(self.rules.score_increment);
            self.state.is_guess_wrong = false;
            tracing::debug!("Correct guess, score is now {}", self.state.score);
            self.advance();
            GuessOutcome::Correct
        } else {
            self.state.is_guess_wrong = true;
            tracing::debug!("Incorrect guess '{}'", GuessValidator::normalize(guess));
            GuessOutcome::Incorrect
        }
    }

    /// Move past the current word without changing the score
    pub fn skip_word(&mut self) {
        if self.state.is_game_over {
            tracing::debug!("Ignoring skip, game is over");
            return;
        }

        self.state.is_guess_wrong = false;
        self.advance();
    }

    /// Throw away the current game and start again from round 1
    pub fn reset_game(&mut self) {
        self.state = GameState::new();
        self.pick_next_scrambled_word();
    }

    pub fn current_scrambled_word(&self) -> Option<&str> {
        self.state.current.as_ref().map(|c| c.scrambled.as_str())
    }

    pub fn current_word_count(&self) -> usize {
        self.state.current_word_count
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn is_guess_wrong(&self) -> bool {
        self.state.is_guess_wrong
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over
    }

    /// Words already presented in this game, in no particular order
    pub fn used_words(&self) -> impl Iterator<Item = &str> {
        let words = &self.words;
        self.state.used_words.iter().map(move |&idx| &words[idx])
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            scrambled_word: self.current_scrambled_word().map(str::to_string),
            round: self.state.current_word_count,
            total_rounds: self.total_rounds(),
            score: self.state.score,
            is_guess_wrong: self.state.is_guess_wrong,
            is_game_over: self.state.is_game_over,
        }
    }

    /// The unscrambled current word
    #[cfg(test)]
    pub(crate) fn current_answer(&self) -> Option<&str> {
        self.state.current.as_ref().map(|c| &self.words[c.index])
    }

    fn advance(&mut self) {
        if let Some(current) = self.state.current.take() {
            self.state.used_words.insert(current.index);
        }
        self.state.current_word_count += 1;
        self.pick_next_scrambled_word();
    }

    fn finish(&mut self) {
        if !self.state.is_game_over {
            tracing::debug!("Game over with score {}", self.state.score);
        }
        self.state.current = None;
        self.state.is_game_over = true;
    }
}
