use crate::bounded::TimeLimited;
use crate::config::{ConfigError, EngineConfig};
use crate::data::Dictionary;
use crate::game::{BeginError, Game};
use crate::results::*;
use crate::session::{ScopeSession, SessionStore};
use crate::stats::{GuildStats, StatsAggregator};
use crate::store::GameStore;
use crate::ScopeId;
use std::result::Result;
use std::sync::Arc;

/// The result of [`GameCoordinator::start_or_get_game`].
#[derive(Debug, Clone)]
pub struct StartedGame {
    /// The scope's game after the call.
    pub game: Game,
    /// `false` if a game was already in progress and was returned unchanged.
    pub created: bool,
    /// Each seed word, normalized, with what happened when it was guessed.
    pub seed_results: Vec<(String, WordGuessResult)>,
    /// Fresh stats, if the seed words finished the game.
    pub stats: Option<GuildStats>,
}

/// The result of [`GameCoordinator::submit_guess`].
#[derive(Debug, Clone)]
pub struct GuessOutcome {
    pub result: WordGuessResult,
    /// The scope's game after the guess.
    pub game: Game,
    /// Fresh stats, if this guess finished the game.
    pub stats: Option<GuildStats>,
}

/// Runs games for many scopes: starts sessions, routes guesses to the active game, persists every
/// accepted guess and keeps stats up to date.
///
/// Requests for the same scope are applied one at a time; requests for different scopes run
/// independently.
///
/// ```no_run
/// use wordle_engine::*;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let dictionary = FrequencyWordList::from_iterator([("allot", 2_000_000), ("lolly", 200_000)]);
/// let coordinator =
///     GameCoordinator::new(EngineConfig::default(), dictionary, InMemoryGameStore::new())?;
/// let scope = ScopeId::from("guild");
///
/// coordinator.start_or_get_game(&scope, None, &[], "alice").await?;
/// let outcome = coordinator.submit_guess(&scope, "lolly", "bob").await?;
/// assert_eq!(outcome.result, WordGuessResult::Accepted);
/// # Ok(())
/// # }
/// ```
pub struct GameCoordinator<D, S> {
    config: EngineConfig,
    dictionary: TimeLimited<D>,
    sessions: SessionStore<TimeLimited<S>>,
    stats: StatsAggregator<TimeLimited<S>>,
}

impl<D: Dictionary, S: GameStore> GameCoordinator<D, S> {
    /// Creates a coordinator. Every dictionary and store call is bounded by
    /// `config.io_timeout`.
    ///
    /// Fails if `config` has a zero limit (see [`EngineConfig::validate`]).
    pub fn new(
        config: EngineConfig,
        dictionary: D,
        store: S,
    ) -> Result<GameCoordinator<D, S>, ConfigError> {
        config.validate()?;
        let store = Arc::new(TimeLimited::new(store, config.io_timeout));
        Ok(GameCoordinator {
            config,
            dictionary: TimeLimited::new(dictionary, config.io_timeout),
            sessions: SessionStore::new(Arc::clone(&store), config.rules()),
            stats: StatsAggregator::new(store, config.max_guesses),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the scope's game in progress, or starts a new one.
    ///
    /// A new game gets a solution of `requested_length` letters (or the configured default), then
    /// each of `seed_words` is guessed on behalf of `participant`. An existing game is returned
    /// unchanged and the seed words are ignored.
    pub async fn start_or_get_game(
        &self,
        scope: &ScopeId,
        requested_length: Option<usize>,
        seed_words: &[String],
        participant: &str,
    ) -> Result<StartedGame, WordleError> {
        let mut session = self.sessions.lock(scope).await;
        if let Some(game) = self.find_active(&mut session).await? {
            return Ok(StartedGame {
                game: game.clone(),
                created: false,
                seed_results: Vec::new(),
                stats: None,
            });
        }

        let length = requested_length.unwrap_or(self.config.default_word_length);
        let mut game = Game::new(self.config.rules());
        match game.begin(&self.dictionary, length).await {
            Ok(()) => {}
            Err(BeginError::Dictionary(error)) => {
                tracing::warn!(scope = %scope, length, %error, "could not choose a solution");
                return Err(error.into());
            }
            Err(error) => {
                tracing::info!(scope = %scope, length, ?error, "no solution available");
                return Err(WordleError::NoSolution { length });
            }
        }

        let mut seed_results = Vec::with_capacity(seed_words.len());
        for word in seed_words {
            let word = normalize(word);
            if word.is_empty() {
                continue;
            }
            let result = game
                .guess(&word, participant, Some(&self.dictionary))
                .await?;
            seed_results.push((word, result));
        }

        session.insert(game);
        if let Err(error) = session.save().await {
            tracing::warn!(scope = %scope, %error, "discarding new game that could not be saved");
            session.evict();
            return Err(error.into());
        }
        tracing::info!(scope = %scope, length, seeds = seed_results.len(), "started game");

        let (game, stats) = self.settle(&mut session).await?;
        Ok(StartedGame {
            game,
            created: true,
            seed_results,
            stats,
        })
    }

    /// Guesses `word` in the scope's active game on behalf of `participant`.
    ///
    /// Accepted guesses are saved before this returns. If saving fails the guess is undone and
    /// the error is returned.
    pub async fn submit_guess(
        &self,
        scope: &ScopeId,
        word: &str,
        participant: &str,
    ) -> Result<GuessOutcome, WordleError> {
        let word = normalize(word);
        let mut session = self.sessions.lock(scope).await;
        let Some(game) = self.find_active(&mut session).await? else {
            return Err(WordleError::NoActiveGame(scope.clone()));
        };

        let before = game.clone();
        let result = game
            .guess(&word, participant, Some(&self.dictionary))
            .await?;
        tracing::debug!(scope = %scope, guess = %word, ?result, "guess submitted");
        if result != WordGuessResult::Accepted {
            return Ok(GuessOutcome {
                result,
                game: before,
                stats: None,
            });
        }

        if let Err(error) = session.save().await {
            tracing::warn!(scope = %scope, %error, "rolling back guess that could not be saved");
            session.insert(before);
            return Err(error.into());
        }

        let (game, stats) = self.settle(&mut session).await?;
        Ok(GuessOutcome {
            result,
            game,
            stats,
        })
    }

    /// Returns a copy of the scope's game in progress, if there is one.
    pub async fn active_game(&self, scope: &ScopeId) -> Result<Option<Game>, WordleError> {
        let mut session = self.sessions.lock(scope).await;
        Ok(self.find_active(&mut session).await?.cloned())
    }

    /// Returns the scope's stored stats.
    pub async fn stats(&self, scope: &ScopeId) -> Result<GuildStats, WordleError> {
        Ok(self.stats.stats(scope).await?)
    }

    /// Rebuilds the scope's stats from its full game history.
    pub async fn recompute_stats(&self, scope: &ScopeId) -> Result<GuildStats, WordleError> {
        let _session = self.sessions.lock(scope).await;
        Ok(self.stats.recompute(scope).await?)
    }

    /// Returns the scope's in-progress game. A stored game that turns out to be finished when it is
    /// resumed is settled first.
    async fn find_active<'s>(
        &self,
        session: &'s mut ScopeSession<'_, TimeLimited<S>>,
    ) -> Result<Option<&'s mut Game>, WordleError> {
        session.load().await?;
        if session
            .current()
            .is_some_and(|game| game.state().is_finished())
        {
            self.settle(session).await?;
        }
        Ok(session.active())
    }

    /// Evicts the cached game if it has finished, and recomputes stats for it.
    async fn settle(
        &self,
        session: &mut ScopeSession<'_, TimeLimited<S>>,
    ) -> Result<(Game, Option<GuildStats>), WordleError> {
        let game = session
            .current()
            .cloned()
            .ok_or_else(|| WordleError::NoActiveGame(session.scope().clone()))?;
        if !game.state().is_finished() {
            return Ok((game, None));
        }

        session.evict();
        tracing::info!(
            scope = %session.scope(),
            state = ?game.state(),
            guesses = game.guesses().len(),
            elapsed_ms = game.elapsed_ms(),
            "game finished"
        );
        let stats = match self.stats.recompute(session.scope()).await {
            Ok(stats) => Some(stats),
            Err(error) => {
                tracing::warn!(scope = %session.scope(), %error, "could not recompute stats");
                None
            }
        };
        Ok((game, stats))
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_ascii_lowercase()
}
