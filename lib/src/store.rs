use crate::game::{GameId, GameState};
use crate::stats::GuildStats;
use crate::ScopeId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// Indicates that the game store could not complete an operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode or decode stored data: {0}")]
    Encoding(String),
    #[error("{0}")]
    Unavailable(String),
}

/// The durable form of a game.
///
/// Only the facts needed to rebuild the game are kept; per-guess feedback is recomputed from
/// `guesses` when a game is resumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// `None` until the record is first saved.
    pub id: Option<GameId>,
    pub scope: ScopeId,
    pub solution: String,
    pub guesses: Vec<String>,
    pub participants: Vec<String>,
    pub state: GameState,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// When the record was last saved. Orders a scope's history.
    pub updated_at: DateTime<Utc>,
}

/// A durable collection of games and per-scope stats.
pub trait GameStore: Send + Sync {
    /// Inserts the record if it has no id yet, otherwise replaces the stored record with the same
    /// id. Returns the record's id.
    fn save_game(
        &self,
        record: &GameRecord,
    ) -> impl Future<Output = Result<GameId, StoreError>> + Send;

    /// Finds the scope's game that is `InProgress`, if any.
    fn find_in_progress(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<GameRecord>, StoreError>> + Send;

    /// Returns the scope's won and lost games, oldest first.
    fn completed_games(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, StoreError>> + Send;

    fn load_stats(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<GuildStats>, StoreError>> + Send;

    /// Replaces the stats stored for `stats.scope`.
    fn save_stats(&self, stats: &GuildStats) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<S: GameStore> GameStore for Arc<S> {
    fn save_game(
        &self,
        record: &GameRecord,
    ) -> impl Future<Output = Result<GameId, StoreError>> + Send {
        self.as_ref().save_game(record)
    }

    fn find_in_progress(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<GameRecord>, StoreError>> + Send {
        self.as_ref().find_in_progress(scope)
    }

    fn completed_games(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Vec<GameRecord>, StoreError>> + Send {
        self.as_ref().completed_games(scope)
    }

    fn load_stats(
        &self,
        scope: &ScopeId,
    ) -> impl Future<Output = Result<Option<GuildStats>, StoreError>> + Send {
        self.as_ref().load_stats(scope)
    }

    fn save_stats(
        &self,
        stats: &GuildStats,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.as_ref().save_stats(stats)
    }
}

/// The stored collections, shared by the in-memory and file-backed stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Collections {
    next_id: u64,
    games: BTreeMap<GameId, GameRecord>,
    stats: HashMap<ScopeId, GuildStats>,
}

impl Collections {
    pub(crate) fn save_game(&mut self, record: &GameRecord) -> GameId {
        let id = match record.id {
            Some(id) => {
                if self.next_id <= id.0 {
                    self.next_id = id.0 + 1;
                }
                id
            }
            None => {
                self.next_id += 1;
                GameId(self.next_id)
            }
        };
        let mut stored = record.clone();
        stored.id = Some(id);
        self.games.insert(id, stored);
        id
    }

    pub(crate) fn find_in_progress(&self, scope: &ScopeId) -> Option<GameRecord> {
        self.games
            .values()
            .filter(|record| record.scope == *scope && record.state == GameState::InProgress)
            .max_by_key(|record| (record.updated_at, record.id))
            .cloned()
    }

    pub(crate) fn completed_games(&self, scope: &ScopeId) -> Vec<GameRecord> {
        let mut games: Vec<GameRecord> = self
            .games
            .values()
            .filter(|record| record.scope == *scope && record.state.is_finished())
            .cloned()
            .collect();
        games.sort_by_key(|record| (record.updated_at, record.id));
        games
    }

    pub(crate) fn load_stats(&self, scope: &ScopeId) -> Option<GuildStats> {
        self.stats.get(scope).cloned()
    }

    pub(crate) fn save_stats(&mut self, stats: &GuildStats) {
        self.stats.insert(stats.scope.clone(), stats.clone());
    }
}

/// A [`GameStore`] that only lives as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryGameStore {
    collections: RwLock<Collections>,
}

impl InMemoryGameStore {
    pub fn new() -> InMemoryGameStore {
        InMemoryGameStore::default()
    }

    /// Returns the number of stored games, in any state.
    pub async fn len(&self) -> usize {
        self.collections.read().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl GameStore for InMemoryGameStore {
    async fn save_game(&self, record: &GameRecord) -> Result<GameId, StoreError> {
        Ok(self.collections.write().await.save_game(record))
    }

    async fn find_in_progress(&self, scope: &ScopeId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.collections.read().await.find_in_progress(scope))
    }

    async fn completed_games(&self, scope: &ScopeId) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.collections.read().await.completed_games(scope))
    }

    async fn load_stats(&self, scope: &ScopeId) -> Result<Option<GuildStats>, StoreError> {
        Ok(self.collections.read().await.load_stats(scope))
    }

    async fn save_stats(&self, stats: &GuildStats) -> Result<(), StoreError> {
        self.collections.write().await.save_stats(stats);
        Ok(())
    }
}
