use crate::game::GameState;
use crate::store::{GameRecord, GameStore, StoreError};
use crate::ScopeId;
use serde::{Deserialize, Serialize};
use std::result::Result;
use std::sync::Arc;

/// Summary statistics for one scope, derived from its finished games.
///
/// This is a materialized view: it can always be rebuilt from the game history with
/// [`GuildStats::from_history`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildStats {
    pub scope: ScopeId,
    pub total_played: u32,
    pub total_won: u32,
    /// Percentage of games won, from 0 to 100.
    pub win_pct: f64,
    /// Mean number of guesses over won games.
    pub avg_guesses: f64,
    /// Fewest guesses in a won game.
    pub best_guess: Option<usize>,
    pub best_streak: u32,
    pub current_streak: u32,
    /// Fastest won game, in milliseconds.
    pub best_time_ms: Option<u64>,
    /// Number of wins for each guess count; index `n - 1` counts wins in `n` guesses.
    pub guess_distribution: Vec<u32>,
}

impl GuildStats {
    /// Stats for a scope with no finished games.
    pub fn empty(scope: ScopeId, max_guesses: usize) -> GuildStats {
        GuildStats {
            scope,
            total_played: 0,
            total_won: 0,
            win_pct: 0.0,
            avg_guesses: 0.0,
            best_guess: None,
            best_streak: 0,
            current_streak: 0,
            best_time_ms: None,
            guess_distribution: vec![0; max_guesses],
        }
    }

    /// Folds a scope's history, oldest game first, into stats. Games that aren't won or lost are
    /// ignored.
    pub fn from_history(scope: ScopeId, history: &[GameRecord], max_guesses: usize) -> GuildStats {
        let mut stats = GuildStats::empty(scope, max_guesses);
        let mut total_winning_guesses = 0usize;
        for game in history {
            match game.state {
                GameState::Won => {
                    let num_guesses = game.guesses.len();
                    stats.total_played += 1;
                    stats.total_won += 1;
                    stats.current_streak += 1;
                    stats.best_streak = stats.best_streak.max(stats.current_streak);
                    total_winning_guesses += num_guesses;
                    stats.best_guess = Some(
                        stats
                            .best_guess
                            .map_or(num_guesses, |best| best.min(num_guesses)),
                    );
                    stats.best_time_ms = Some(
                        stats
                            .best_time_ms
                            .map_or(game.elapsed_ms, |best| best.min(game.elapsed_ms)),
                    );
                    if num_guesses > stats.guess_distribution.len() {
                        stats.guess_distribution.resize(num_guesses, 0);
                    }
                    if num_guesses > 0 {
                        stats.guess_distribution[num_guesses - 1] += 1;
                    }
                }
                GameState::Lost => {
                    stats.total_played += 1;
                    stats.current_streak = 0;
                }
                _ => {}
            }
        }
        if stats.total_played > 0 {
            stats.win_pct = f64::from(stats.total_won) / f64::from(stats.total_played) * 100.0;
        }
        if stats.total_won > 0 {
            stats.avg_guesses = total_winning_guesses as f64 / f64::from(stats.total_won);
        }
        stats
    }
}

/// Recomputes and persists [`GuildStats`] from a store's game history.
pub struct StatsAggregator<S> {
    store: Arc<S>,
    max_guesses: usize,
}

impl<S: GameStore> StatsAggregator<S> {
    pub fn new(store: Arc<S>, max_guesses: usize) -> StatsAggregator<S> {
        StatsAggregator { store, max_guesses }
    }

    /// Rebuilds the scope's stats from its full history and overwrites the stored stats.
    pub async fn recompute(&self, scope: &ScopeId) -> Result<GuildStats, StoreError> {
        let history = self.store.completed_games(scope).await?;
        let stats = GuildStats::from_history(scope.clone(), &history, self.max_guesses);
        self.store.save_stats(&stats).await?;
        tracing::info!(
            scope = %scope,
            played = stats.total_played,
            won = stats.total_won,
            current_streak = stats.current_streak,
            "recomputed stats"
        );
        Ok(stats)
    }

    /// Returns the stored stats, or empty stats if the scope has never finished a game.
    pub async fn stats(&self, scope: &ScopeId) -> Result<GuildStats, StoreError> {
        Ok(self
            .store
            .load_stats(scope)
            .await?
            .unwrap_or_else(|| GuildStats::empty(scope.clone(), self.max_guesses)))
    }
}
