use crate::data::{Dictionary, DictionaryError};
use crate::results::*;
use crate::store::GameRecord;
use crate::ScopeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::result::Result;

/// Identifies a persisted game. Assigned by the store on the first save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The lifecycle of a game.
///
/// Persisted by variant name, so stored records stay readable if variants are added or
/// reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    InProgress,
    Won,
    Lost,
    /// A solution could not be chosen because the dictionary was unavailable.
    Error,
}

impl GameState {
    /// Returns `true` for `Won` and `Lost`.
    pub fn is_finished(&self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

/// The limits a game is played under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub max_guesses: usize,
    /// Solutions must be more frequent than this.
    pub solution_rarity: u64,
    /// Guesses must be more frequent than this. Looser than `solution_rarity`.
    pub guess_rarity: u64,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            max_guesses: 6,
            solution_rarity: 1_000_000,
            guess_rarity: 150_000,
        }
    }
}

/// Why a game could not begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginError {
    /// The game was already started.
    BadState(GameState),
    /// There are no solution candidates of the requested length.
    NotFound,
    Dictionary(DictionaryError),
}

/// The best status seen so far for each guessed letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LetterStatuses {
    statuses: BTreeMap<char, LetterStatus>,
}

impl LetterStatuses {
    /// Returns the best status recorded for `letter`, or `None` if it hasn't been guessed.
    pub fn get(&self, letter: char) -> Option<LetterStatus> {
        self.statuses.get(&letter).copied()
    }

    /// Records `status` for `letter` unless a better one is already known.
    pub fn upgrade(&mut self, letter: char, status: LetterStatus) {
        self.statuses
            .entry(letter)
            .and_modify(|existing| *existing = (*existing).max(status))
            .or_insert(status);
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, LetterStatus)> + '_ {
        self.statuses
            .iter()
            .map(|(letter, status)| (*letter, *status))
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}

/// A single word-guessing session.
///
/// `guesses`, `feedback` and `participants` always have the same length. Feedback and letter
/// statuses are derived from the guesses alone, which is what makes replaying stored guesses an
/// exact way to resume a game.
#[derive(Debug, Clone)]
pub struct Game {
    id: Option<GameId>,
    rules: GameRules,
    state: GameState,
    solution: String,
    guesses: Vec<String>,
    feedback: Vec<Vec<LetterStatus>>,
    participants: Vec<String>,
    letter_statuses: LetterStatuses,
    started_at: Option<DateTime<Utc>>,
    elapsed_ms: u64,
}

impl Game {
    /// Creates a game that has not started yet.
    pub fn new(rules: GameRules) -> Game {
        Game {
            id: None,
            rules,
            state: GameState::NotStarted,
            solution: String::new(),
            guesses: Vec::new(),
            feedback: Vec::new(),
            participants: Vec::new(),
            letter_statuses: LetterStatuses::default(),
            started_at: None,
            elapsed_ms: 0,
        }
    }

    /// Creates a game already in progress with the given solution.
    pub fn with_solution(rules: GameRules, solution: &str, started_at: DateTime<Utc>) -> Game {
        let mut game = Game::new(rules);
        game.solution = solution.to_ascii_lowercase();
        game.state = GameState::InProgress;
        game.started_at = Some(started_at);
        game
    }

    /// Picks a solution of the given length and starts the game.
    ///
    /// If there is no suitable word the game stays `NotStarted`. If the dictionary fails, the
    /// game moves to `Error`.
    pub async fn begin<D: Dictionary + ?Sized>(
        &mut self,
        dictionary: &D,
        length: usize,
    ) -> Result<(), BeginError> {
        if self.state != GameState::NotStarted {
            return Err(BeginError::BadState(self.state));
        }
        match dictionary
            .random_word(length, self.rules.solution_rarity)
            .await
        {
            Ok(Some(word)) => {
                self.solution = word.to_ascii_lowercase();
                self.state = GameState::InProgress;
                self.started_at = Some(Utc::now());
                tracing::debug!(length, "chose a solution");
                Ok(())
            }
            Ok(None) => Err(BeginError::NotFound),
            Err(error) => {
                self.state = GameState::Error;
                Err(BeginError::Dictionary(error))
            }
        }
    }

    /// Submits a guess.
    ///
    /// With a `dictionary`, the word must be a known word at the guess rarity threshold. Without
    /// one the word is trusted, which is only meant for replaying stored guesses.
    ///
    /// The game is only modified when the guess is `Accepted`; a dictionary failure leaves it
    /// untouched.
    pub async fn guess<D: Dictionary + ?Sized>(
        &mut self,
        word: &str,
        participant: &str,
        dictionary: Option<&D>,
    ) -> Result<WordGuessResult, DictionaryError> {
        if let Some(rejection) = self.check_guess(word) {
            return Ok(rejection);
        }
        if let Some(dictionary) = dictionary {
            if !word.bytes().all(|letter| letter.is_ascii_alphabetic())
                || !dictionary
                    .exists(&word.to_ascii_lowercase(), self.rules.guess_rarity)
                    .await?
            {
                return Ok(WordGuessResult::NotAWord);
            }
        }
        Ok(self.record_guess(word, participant))
    }

    /// Applies a guess without consulting a dictionary.
    pub fn record_guess(&mut self, word: &str, participant: &str) -> WordGuessResult {
        if let Some(rejection) = self.check_guess(word) {
            return rejection;
        }
        let word = word.to_ascii_lowercase();
        let results = match get_result_for_guess(&self.solution, &word) {
            Ok(result) => result.results,
            Err(_) => return WordGuessResult::BadLength,
        };
        for (letter, status) in word.chars().zip(results.iter()) {
            self.letter_statuses.upgrade(letter, *status);
        }
        let solved = results.iter().all(|status| *status == LetterStatus::Correct);

        self.guesses.push(word);
        self.feedback.push(results);
        self.participants.push(participant.to_string());

        if solved {
            self.finish(GameState::Won);
        } else if self.guesses.len() >= self.rules.max_guesses {
            self.finish(GameState::Lost);
        }
        WordGuessResult::Accepted
    }

    fn check_guess(&self, word: &str) -> Option<WordGuessResult> {
        if self.state != GameState::InProgress {
            return Some(WordGuessResult::BadState);
        }
        if word.chars().count() != self.solution.chars().count() {
            return Some(WordGuessResult::BadLength);
        }
        if self
            .guesses
            .iter()
            .any(|previous| previous.eq_ignore_ascii_case(word))
        {
            return Some(WordGuessResult::AlreadyGuessed);
        }
        None
    }

    fn finish(&mut self, state: GameState) {
        self.state = state;
        if let Some(started_at) = self.started_at {
            self.elapsed_ms = (Utc::now() - started_at)
                .num_milliseconds()
                .try_into()
                .unwrap_or(0);
        }
    }

    /// Builds the durable record for this game. Feedback and letter statuses are not stored.
    pub fn to_record(&self, scope: &ScopeId, updated_at: DateTime<Utc>) -> GameRecord {
        GameRecord {
            id: self.id,
            scope: scope.clone(),
            solution: self.solution.clone(),
            guesses: self.guesses.clone(),
            participants: self.participants.clone(),
            state: self.state,
            started_at: self.started_at.unwrap_or(updated_at),
            elapsed_ms: self.elapsed_ms,
            updated_at,
        }
    }

    /// Rebuilds an in-progress game from its record by replaying the stored guesses in order.
    pub fn resume(rules: GameRules, record: &GameRecord) -> Game {
        let mut game = Game::with_solution(rules, &record.solution, record.started_at);
        game.id = record.id;
        for (index, guess) in record.guesses.iter().enumerate() {
            let participant = record
                .participants
                .get(index)
                .map(String::as_str)
                .unwrap_or_default();
            let result = game.record_guess(guess, participant);
            if result != WordGuessResult::Accepted {
                tracing::warn!(
                    game = ?record.id,
                    guess = %guess,
                    ?result,
                    "skipped a stored guess that could not be replayed"
                );
            }
        }
        if record.state.is_finished() && game.state.is_finished() {
            game.elapsed_ms = record.elapsed_ms;
        }
        game
    }

    pub fn id(&self) -> Option<GameId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: GameId) {
        self.id = Some(id);
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn solution(&self) -> &str {
        &self.solution
    }

    /// The guesses in the order they were made.
    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    /// The per-letter results of each guess, parallel to [`Game::guesses`].
    pub fn feedback(&self) -> &[Vec<LetterStatus>] {
        &self.feedback
    }

    /// Who made each guess, parallel to [`Game::guesses`].
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn letter_statuses(&self) -> &LetterStatuses {
        &self.letter_statuses
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Time taken to finish the game. Zero until the game is won or lost.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// The number of guesses still available.
    pub fn remaining_guesses(&self) -> usize {
        self.rules.max_guesses.saturating_sub(self.guesses.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn letter_statuses_only_improve() {
        let mut statuses = LetterStatuses::default();

        statuses.upgrade('a', LetterStatus::Absent);
        assert_eq!(statuses.get('a'), Some(LetterStatus::Absent));
        statuses.upgrade('a', LetterStatus::Elsewhere);
        assert_eq!(statuses.get('a'), Some(LetterStatus::Elsewhere));
        statuses.upgrade('a', LetterStatus::Correct);
        statuses.upgrade('a', LetterStatus::Absent);
        statuses.upgrade('a', LetterStatus::Elsewhere);
        assert_eq!(statuses.get('a'), Some(LetterStatus::Correct));
        assert_eq!(statuses.get('b'), None);
    }

    #[test]
    fn record_guess_updates_letter_statuses() {
        let mut game = Game::with_solution(GameRules::default(), "allot", Utc::now());

        assert_eq!(game.record_guess("lolly", "p1"), WordGuessResult::Accepted);

        assert_eq!(game.letter_statuses().get('l'), Some(LetterStatus::Correct));
        assert_eq!(game.letter_statuses().get('o'), Some(LetterStatus::Elsewhere));
        assert_eq!(game.letter_statuses().get('y'), Some(LetterStatus::Absent));
        assert_eq!(game.letter_statuses().len(), 3);
    }

    #[test]
    fn winning_sets_elapsed_time() {
        let started_at = Utc::now() - Duration::seconds(90);
        let mut game = Game::with_solution(GameRules::default(), "allot", started_at);

        game.record_guess("allot", "p1");

        assert_eq!(game.state(), GameState::Won);
        assert!(game.elapsed_ms() >= 90_000);
        assert_eq!(game.remaining_guesses(), 5);
    }

    #[test]
    fn elapsed_time_is_zero_while_in_progress() {
        let started_at = Utc::now() - Duration::seconds(90);
        let mut game = Game::with_solution(GameRules::default(), "allot", started_at);

        game.record_guess("below", "p1");

        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(game.elapsed_ms(), 0);
    }

    #[test]
    fn resume_uses_stored_participants() {
        let scope = ScopeId::from("guild");
        let mut game = Game::with_solution(GameRules::default(), "allot", Utc::now());
        game.record_guess("below", "alice");
        game.record_guess("lolly", "bob");

        let resumed = Game::resume(GameRules::default(), &game.to_record(&scope, Utc::now()));

        assert_eq!(resumed.participants(), &["alice", "bob"]);
        assert_eq!(resumed.feedback(), game.feedback());
        assert_eq!(resumed.letter_statuses(), game.letter_statuses());
    }

    #[test]
    fn resume_skips_unreplayable_guesses() {
        let scope = ScopeId::from("guild");
        let game = Game::with_solution(GameRules::default(), "allot", Utc::now());
        let mut record = game.to_record(&scope, Utc::now());
        record.guesses = vec!["below".into(), "toolong".into(), "below".into(), "begot".into()];
        record.participants = vec!["a".into()];

        let resumed = Game::resume(GameRules::default(), &record);

        assert_eq!(resumed.guesses(), &["below", "begot"]);
        assert_eq!(resumed.participants(), &["a", ""]);
    }
}
