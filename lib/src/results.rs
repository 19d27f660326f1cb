use crate::data::DictionaryError;
use crate::store::StoreError;
use crate::ScopeId;
use serde::{Deserialize, Serialize};
use std::result::Result;
use thiserror::Error;

/// The result of a given letter at a specific location.
///
/// Variants are ordered by precedence, so the best status seen for a letter is simply the
/// maximum: `Absent < Elsewhere < Correct`.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum LetterStatus {
    /// The letter is not in the solution, or every occurrence was already matched.
    Absent,
    /// The letter is in the solution, but at another location.
    Elsewhere,
    /// The letter is at this exact location in the solution.
    Correct,
}

/// The result of a single word guess.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct GuessResult<'a> {
    pub guess: &'a str,
    /// The result of each letter, provided in the same letter order as in the guess.
    pub results: Vec<LetterStatus>,
}

impl GuessResult<'_> {
    /// Returns `true` iff every letter is [`LetterStatus::Correct`].
    pub fn is_solved(&self) -> bool {
        self.results
            .iter()
            .all(|status| *status == LetterStatus::Correct)
    }
}

/// What happened to a submitted guess.
///
/// Everything but `Accepted` is a user-input problem; the game is left untouched.
#[derive(Debug, Eq, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum WordGuessResult {
    Accepted,
    /// The game is not in progress.
    BadState,
    /// The guess does not have the same number of letters as the solution.
    BadLength,
    /// The same word was already guessed in this game.
    AlreadyGuessed,
    /// The word is not in the dictionary, or is too rare to be accepted.
    NotAWord,
}

/// Indicates that an error occurred while running a game.
#[derive(Debug, Error)]
pub enum WordleError {
    /// A guess was compared against a solution of a different length. Contains the solution's
    /// length.
    #[error("guess must have {0} letters")]
    WordLength(usize),
    /// There is no game in progress for the scope.
    #[error("no game is in progress for {0}")]
    NoActiveGame(ScopeId),
    /// The dictionary has no solution candidates of the requested length.
    #[error("could not start a game: no {length}-letter solution is available")]
    NoSolution { length: usize },
    #[error("dictionary unavailable: {0}")]
    DictionaryUnavailable(#[from] DictionaryError),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl WordleError {
    /// Whether the same request may succeed later. Callers should answer these with a generic
    /// "try again later".
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WordleError::DictionaryUnavailable(_) | WordleError::StoreUnavailable(_)
        )
    }
}

/// Determines the result of the given `guess` when applied to the given `solution`.
///
/// Exact matches are resolved first, and each matched letter of the solution is consumed, so a
/// repeated letter in the guess lights up at most as many times as it occurs in the solution.
///
/// ```
/// use wordle_engine::{get_result_for_guess, LetterStatus};
///
/// let result = get_result_for_guess("allot", "lolly").unwrap();
/// assert_eq!(
///     result.results,
///     vec![
///         LetterStatus::Elsewhere,
///         LetterStatus::Elsewhere,
///         LetterStatus::Correct,
///         LetterStatus::Absent,
///         LetterStatus::Absent,
///     ]
/// );
/// ```
pub fn get_result_for_guess<'a>(
    solution: &str,
    guess: &'a str,
) -> Result<GuessResult<'a>, WordleError> {
    let mut remaining: Vec<Option<char>> = solution.chars().map(Some).collect();
    let guess_letters: Vec<char> = guess.chars().collect();
    if remaining.len() != guess_letters.len() {
        return Err(WordleError::WordLength(remaining.len()));
    }

    let mut results = vec![LetterStatus::Absent; guess_letters.len()];
    for (index, letter) in guess_letters.iter().enumerate() {
        if remaining[index] == Some(*letter) {
            remaining[index] = None;
            results[index] = LetterStatus::Correct;
        }
    }
    for (index, letter) in guess_letters.iter().enumerate() {
        if results[index] == LetterStatus::Correct {
            continue;
        }
        if let Some(slot) = remaining
            .iter_mut()
            .find(|maybe_letter| **maybe_letter == Some(*letter))
        {
            *slot = None;
            results[index] = LetterStatus::Elsewhere;
        }
    }

    Ok(GuessResult { guess, results })
}
