mod builtin;

use std::collections::HashSet;
use std::ops::Index;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio::fs;

use crate::utils::letters::distinct_letter_count;

static BUILTIN: Lazy<Arc<WordList>> = Lazy::new(|| {
    Arc::new(WordList::new(builtin::WORDS.iter().copied()).expect("built-in word list is valid"))
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordListError {
    #[error("word list is empty")]
    Empty,
    #[error("word '{0}' is shorter than two letters")]
    TooShort(String),
    #[error("word '{0}' has no rearrangement different from itself")]
    Unscramblable(String),
    #[error("word '{0}' appears more than once")]
    Duplicate(String),
}

/// Ordered pool of distinct words a game draws its rounds from.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    /// Build a word list, trimming each entry.
    ///
    /// Every word must have at least two distinct letters, ignoring case, so it
    /// can always be scrambled into something other than itself under either
    /// guess policy. Duplicates are compared case-insensitively since guesses
    /// are too by default.
    pub fn new<I, S>(words: I) -> Result<Self, WordListError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut list = Vec::new();

        for word in words {
            let word = word.as_ref().trim();
            if word.chars().count() < 2 {
                return Err(WordListError::TooShort(word.to_string()));
            }
            if distinct_letter_count(word) < 2 {
                return Err(WordListError::Unscramblable(word.to_string()));
            }
            if !seen.insert(word.to_lowercase()) {
                return Err(WordListError::Duplicate(word.to_string()));
            }
            list.push(word.to_string());
        }

        if list.is_empty() {
            return Err(WordListError::Empty);
        }

        Ok(Self { words: list })
    }

    /// Parse a word list file: one word per line, blank lines and `#` comments ignored
    pub fn parse(content: &str) -> Result<Self, WordListError> {
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a word list from a file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read word list {}", path.display()))?;
        let list = Self::parse(&content)
            .with_context(|| format!("invalid word list {}", path.display()))?;

        tracing::info!("Loaded {} words from {}", list.len(), path.display());

        Ok(list)
    }

    /// The word pool shipped with the server
    pub fn builtin() -> Arc<Self> {
        BUILTIN.clone()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed list; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Index<usize> for WordList {
    type Output = str;

    fn index(&self, idx: usize) -> &str {
        &self.words[idx]
    }
}
