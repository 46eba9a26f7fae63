/// Decides whether a typed guess matches the word being unscrambled
#[derive(Debug, Clone, Copy, Default)]
pub struct GuessValidator {
    case_sensitive: bool,
}

impl GuessValidator {
    pub fn new(case_sensitive: bool) -> Self {
        Self { case_sensitive }
    }

    /// Surrounding whitespace is never significant
    pub fn normalize(guess: &str) -> &str {
        guess.trim()
    }

    /// Check a guess against the answer. An empty guess is never correct.
    pub fn is_correct(&self, guess: &str, answer: &str) -> bool {
        let guess = Self::normalize(guess);
        if guess.is_empty() {
            return false;
        }

        if self.case_sensitive {
            guess == answer
        } else {
            guess.to_lowercase() == answer.to_lowercase()
        }
    }
}
