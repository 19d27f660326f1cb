use crate::data::{Dictionary, DictionaryError};
use crate::game::GameId;
use crate::stats::GuildStats;
use crate::store::{GameRecord, GameStore, StoreError};
use crate::ScopeId;
use std::future::Future;
use std::result::Result;
use std::sync::Arc;
use std::time::Duration;

/// Bounds every call to the wrapped [`Dictionary`] or [`GameStore`] by a deadline.
///
/// A call that misses the deadline fails with a `Timeout` error instead of waiting.
#[derive(Debug, Clone)]
pub struct TimeLimited<T> {
    inner: T,
    limit: Duration,
}

impl<T> TimeLimited<T> {
    pub fn new(inner: T, limit: Duration) -> TimeLimited<T> {
        TimeLimited { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

async fn within<T, E>(
    limit: Duration,
    operation: impl Future<Output = Result<T, E>>,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}

impl<D: Dictionary> Dictionary for TimeLimited<D> {
    async fn random_word(
        &self,
        length: usize,
        min_rarity: u64,
    ) -> Result<Option<Arc<str>>, DictionaryError> {
        within(
            self.limit,
            self.inner.random_word(length, min_rarity),
            DictionaryError::Timeout,
        )
        .await
    }

    async fn exists(&self, word: &str, min_rarity: u64) -> Result<bool, DictionaryError> {
        within(
            self.limit,
            self.inner.exists(word, min_rarity),
            DictionaryError::Timeout,
        )
        .await
    }
}

impl<S: GameStore> GameStore for TimeLimited<S> {
    async fn save_game(&self, record: &GameRecord) -> Result<GameId, StoreError> {
        within(self.limit, self.inner.save_game(record), StoreError::Timeout).await
    }

    async fn find_in_progress(&self, scope: &ScopeId) -> Result<Option<GameRecord>, StoreError> {
        within(
            self.limit,
            self.inner.find_in_progress(scope),
            StoreError::Timeout,
        )
        .await
    }

    async fn completed_games(&self, scope: &ScopeId) -> Result<Vec<GameRecord>, StoreError> {
        within(
            self.limit,
            self.inner.completed_games(scope),
            StoreError::Timeout,
        )
        .await
    }

    async fn load_stats(&self, scope: &ScopeId) -> Result<Option<GuildStats>, StoreError> {
        within(self.limit, self.inner.load_stats(scope), StoreError::Timeout).await
    }

    async fn save_stats(&self, stats: &GuildStats) -> Result<(), StoreError> {
        within(self.limit, self.inner.save_stats(stats), StoreError::Timeout).await
    }
}
