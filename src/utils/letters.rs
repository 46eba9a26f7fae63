use std::collections::HashSet;

/// Number of distinct letters in a word, ignoring case.
/// A word needs at least two to have a rearrangement that differs from it
/// under either guess policy.
pub fn distinct_letter_count(word: &str) -> usize {
    word.chars()
        .map(|c| c.to_lowercase().collect::<String>())
        .collect::<HashSet<_>>()
        .len()
}

/// Compare two letters, folding case unless `case_sensitive`
pub fn same_letter(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

/// Compare two letter sequences position by position under a case policy
pub fn same_letters(a: &[char], b: &[char], case_sensitive: bool) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(x, y)| same_letter(*x, *y, case_sensitive))
}

/// Letters of a word in sorted order, used to compare rearrangements
pub fn sorted_letters(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = word.chars().collect();
    letters.sort_unstable();
    letters
}

/// Check if `candidate` uses exactly the letters of `word` (same multiset)
pub fn is_rearrangement_of(candidate: &str, word: &str) -> bool {
    sorted_letters(candidate) == sorted_letters(word)
}

/// Swap the first letter with the first letter that differs from it under the
/// case policy. Returns false (and leaves the slice untouched) when every letter
/// is the same.
pub fn swap_first_distinct(letters: &mut [char], case_sensitive: bool) -> bool {
    let Some(first) = letters.first().copied() else {
        return false;
    };

    match letters
        .iter()
        .position(|c| !same_letter(*c, first, case_sensitive))
    {
        Some(idx) => {
            letters.swap(0, idx);
            true
        }
        None => false,
    }
}
