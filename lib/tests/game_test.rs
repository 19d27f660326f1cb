#[macro_use]
extern crate assert_matches;

use chrono::Utc;
use std::sync::Arc;
use wordle_engine::*;

const GUESSES: [&str; 8] = [
    "below", "begot", "endow", "ingot", "other", "lolly", "alpha", "sassy",
];

fn dictionary() -> FrequencyWordList {
    FrequencyWordList::from_iterator(
        GUESSES
            .iter()
            .map(|word| (*word, 200_000))
            .chain([("allot", 2_000_000), ("rarer", 10)]),
    )
}

struct BrokenDictionary;

impl Dictionary for BrokenDictionary {
    async fn random_word(
        &self,
        _length: usize,
        _min_rarity: u64,
    ) -> Result<Option<Arc<str>>, DictionaryError> {
        Err(DictionaryError::Unavailable("connection refused".to_string()))
    }

    async fn exists(&self, _word: &str, _min_rarity: u64) -> Result<bool, DictionaryError> {
        Err(DictionaryError::Unavailable("connection refused".to_string()))
    }
}

async fn started_game() -> Game {
    let mut game = Game::new(GameRules::default());
    game.begin(&dictionary(), 5).await.unwrap();
    game
}

#[tokio::test]
async fn begin_chooses_a_common_solution() {
    let game = started_game().await;

    assert_eq!(game.state(), GameState::InProgress);
    assert_eq!(game.solution(), "allot");
    assert!(game.started_at().is_some());
    assert!(game.guesses().is_empty());
    assert_eq!(game.id(), None);
}

#[tokio::test]
async fn begin_without_candidates_stays_not_started() {
    let mut game = Game::new(GameRules::default());

    assert_eq!(game.begin(&dictionary(), 9).await, Err(BeginError::NotFound));
    assert_eq!(game.state(), GameState::NotStarted);
}

#[tokio::test]
async fn begin_with_broken_dictionary_is_an_error() {
    let mut game = Game::new(GameRules::default());

    assert_matches!(
        game.begin(&BrokenDictionary, 5).await,
        Err(BeginError::Dictionary(DictionaryError::Unavailable(_)))
    );
    assert_eq!(game.state(), GameState::Error);
    assert_eq!(
        game.guess("allot", "p1", Some(&dictionary())).await,
        Ok(WordGuessResult::BadState)
    );
    assert_matches!(
        game.begin(&dictionary(), 5).await,
        Err(BeginError::BadState(GameState::Error))
    );
}

#[tokio::test]
async fn six_misses_lose_the_game() -> Result<(), DictionaryError> {
    let words = dictionary();
    let mut game = started_game().await;

    for (index, word) in GUESSES[..6].iter().enumerate() {
        assert_eq!(game.state(), GameState::InProgress);
        assert_eq!(
            game.guess(word, "p1", Some(&words)).await?,
            WordGuessResult::Accepted
        );
        assert_eq!(game.guesses().len(), index + 1);
    }

    assert_eq!(game.state(), GameState::Lost);
    assert_eq!(game.remaining_guesses(), 0);
    assert_eq!(
        game.guess(GUESSES[6], "p1", Some(&words)).await?,
        WordGuessResult::BadState
    );
    assert_eq!(game.guesses().len(), 6);
    Ok(())
}

#[tokio::test]
async fn correct_guess_wins() -> Result<(), DictionaryError> {
    let words = dictionary();
    let mut game = started_game().await;

    game.guess("lolly", "alice", Some(&words)).await?;
    assert_eq!(
        game.guess("ALLOT", "bob", Some(&words)).await?,
        WordGuessResult::Accepted
    );

    assert_eq!(game.state(), GameState::Won);
    assert_eq!(game.guesses(), &["lolly", "allot"]);
    assert_eq!(game.participants(), &["alice", "bob"]);
    assert_eq!(game.feedback().len(), 2);
    assert_eq!(game.feedback()[1], vec![LetterStatus::Correct; 5]);
    assert_eq!(
        game.guess("below", "carol", Some(&words)).await?,
        WordGuessResult::BadState
    );
    Ok(())
}

#[tokio::test]
async fn rejected_guesses_do_not_change_the_game() -> Result<(), DictionaryError> {
    let words = dictionary();
    let mut game = started_game().await;
    game.guess("below", "p1", Some(&words)).await?;

    assert_eq!(
        game.guess("below", "p2", Some(&words)).await?,
        WordGuessResult::AlreadyGuessed
    );
    assert_eq!(
        game.guess("BELOW", "p2", Some(&words)).await?,
        WordGuessResult::AlreadyGuessed
    );
    assert_eq!(
        game.guess("bel", "p2", Some(&words)).await?,
        WordGuessResult::BadLength
    );
    assert_eq!(
        game.guess("rarer", "p2", Some(&words)).await?,
        WordGuessResult::NotAWord
    );
    assert_eq!(
        game.guess("xyzzy", "p2", Some(&words)).await?,
        WordGuessResult::NotAWord
    );
    assert_eq!(
        game.guess("b3low", "p2", Some(&words)).await?,
        WordGuessResult::NotAWord
    );

    assert_eq!(game.guesses(), &["below"]);
    assert_eq!(game.participants(), &["p1"]);
    assert_eq!(game.feedback().len(), 1);
    assert_eq!(game.state(), GameState::InProgress);
    Ok(())
}

#[tokio::test]
async fn dictionary_failure_during_guess_leaves_game_untouched() {
    let mut game = started_game().await;

    assert_matches!(
        game.guess("below", "p1", Some(&BrokenDictionary)).await,
        Err(DictionaryError::Unavailable(_))
    );
    assert!(game.guesses().is_empty());
    assert!(game.letter_statuses().is_empty());
}

#[tokio::test]
async fn unvalidated_guesses_skip_the_dictionary() {
    let mut game = started_game().await;

    assert_eq!(
        game.guess::<BrokenDictionary>("xyzzy", "p1", None).await,
        Ok(WordGuessResult::Accepted)
    );
    assert_eq!(game.record_guess("qqqqq", "p1"), WordGuessResult::Accepted);
    assert_eq!(game.guesses().len(), 2);
}

#[tokio::test]
async fn letter_statuses_never_downgrade() -> Result<(), DictionaryError> {
    let words = dictionary();
    let mut game = started_game().await;
    let mut previous: Vec<(char, LetterStatus)> = Vec::new();

    for word in ["lolly", "alpha", "below", "sassy", "other"] {
        game.guess(word, "p1", Some(&words)).await?;
        for (letter, status) in &previous {
            let current = game.letter_statuses().get(*letter).unwrap();
            assert!(current >= *status, "{letter} went from {status:?} to {current:?}");
        }
        previous = game.letter_statuses().iter().collect();
    }

    // "lolly" also scores 'l' as Elsewhere and Absent, but the exact match wins.
    assert_eq!(game.letter_statuses().get('l'), Some(LetterStatus::Correct));
    assert_eq!(game.letter_statuses().get('o'), Some(LetterStatus::Correct));
    assert_eq!(game.letter_statuses().get('t'), Some(LetterStatus::Elsewhere));
    assert_eq!(game.letter_statuses().get('s'), Some(LetterStatus::Absent));
    assert_eq!(game.letter_statuses().get('z'), None);
    Ok(())
}

#[test]
fn resumed_game_matches_original() {
    let scope = ScopeId::from("guild");
    let mut game = Game::with_solution(GameRules::default(), "allot", Utc::now());
    for word in ["lolly", "alpha", "below"] {
        game.record_guess(word, "p1");
    }

    let resumed = Game::resume(GameRules::default(), &game.to_record(&scope, Utc::now()));

    assert_eq!(resumed.state(), GameState::InProgress);
    assert_eq!(resumed.solution(), game.solution());
    assert_eq!(resumed.guesses(), game.guesses());
    assert_eq!(resumed.feedback(), game.feedback());
    assert_eq!(resumed.letter_statuses(), game.letter_statuses());
    assert_eq!(resumed.participants(), game.participants());
    assert_eq!(resumed.started_at(), game.started_at());
}

#[test]
fn max_guesses_follows_rules() {
    let rules = GameRules {
        max_guesses: 2,
        ..GameRules::default()
    };
    let mut game = Game::with_solution(rules, "allot", Utc::now());

    game.record_guess("below", "p1");
    assert_eq!(game.state(), GameState::InProgress);
    game.record_guess("begot", "p1");
    assert_eq!(game.state(), GameState::Lost);
}
