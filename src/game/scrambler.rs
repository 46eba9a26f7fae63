use rand::{seq::SliceRandom, Rng};

use crate::utils::letters::{same_letters, swap_first_distinct};

/// Default number of shuffles tried before falling back to a deterministic swap
pub const DEFAULT_MAX_ATTEMPTS: usize = 32;

/// Produces scrambles of a word that never match its original letter order.
/// Unless `case_sensitive`, a scramble that only differs in letter case counts
/// as the original, since it would be accepted as a guess.
#[derive(Debug, Clone, Copy)]
pub struct Scrambler {
    max_attempts: usize,
    case_sensitive: bool,
}

impl Default for Scrambler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, false)
    }
}

impl Scrambler {
    pub fn new(max_attempts: usize, case_sensitive: bool) -> Self {
        Self {
            max_attempts,
            case_sensitive,
        }
    }

    /// Shuffle the letters of `word` until the result differs from it.
    ///
    /// Tries up to `max_attempts` random shuffles. If all of them land on the
    /// original order, the first letter is swapped with the first letter that
    /// differs from it. Returns `None` only for words made of a single repeated
    /// letter (or empty), which have no distinct rearrangement under the case
    /// policy.
    pub fn scramble<R: Rng + ?Sized>(&self, word: &str, rng: &mut R) -> Option<String> {
        let original: Vec<char> = word.chars().collect();
        let mut letters = original.clone();

        for attempt in 1..=self.max_attempts {
            letters.shuffle(rng);
            if !same_letters(&letters, &original, self.case_sensitive) {
                return Some(letters.into_iter().collect());
            }
            tracing::trace!("Scramble attempt {} of '{}' kept original order", attempt, word);
        }

        letters = original;
        if swap_first_distinct(&mut letters, self.case_sensitive) {
            tracing::debug!(
                "Scrambling '{}' fell back to a swap after {} attempts",
                word,
                self.max_attempts
            );
            Some(letters.into_iter().collect())
        } else {
            None
        }
    }
}
