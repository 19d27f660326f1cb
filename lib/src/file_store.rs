use crate::game::GameId;
use crate::stats::GuildStats;
use crate::store::{Collections, GameRecord, GameStore, StoreError};
use crate::ScopeId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::result::Result;
use tokio::sync::RwLock;

/// A [`GameStore`] that keeps its collections in a single RON file.
///
/// Every change rewrites the whole file through a temporary sibling file, so the file on disk is
/// always a complete document. Intended for single-process deployments with modest history.
#[derive(Debug)]
pub struct RonFileGameStore {
    path: PathBuf,
    collections: RwLock<Collections>,
}

impl RonFileGameStore {
    /// Opens the store at `path`, loading any existing document. A missing file is an empty
    /// store; it is created on the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<RonFileGameStore, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => ron::from_str::<Collections>(&contents)
                .map_err(|error| StoreError::Encoding(error.to_string()))?,
            Err(error) if error.kind() == ErrorKind::NotFound => Collections::default(),
            Err(error) => return Err(StoreError::Io(error)),
        };
        tracing::debug!(path = %path.display(), "opened game store");
        Ok(RonFileGameStore {
            path,
            collections: RwLock::new(collections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let contents = ron::ser::to_string_pretty(collections, ron::ser::PrettyConfig::default())
            .map_err(|error| StoreError::Encoding(error.to_string()))?;
        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        tokio::fs::write(&temp_path, contents).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

impl GameStore for RonFileGameStore {
    async fn save_game(&self, record: &GameRecord) -> Result<GameId, StoreError> {
        let mut collections = self.collections.write().await;
        let mut updated = collections.clone();
        let id = updated.save_game(record);
        self.persist(&updated).await?;
        *collections = updated;
        Ok(id)
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
        let mut collections = self.collections.write().await;
        let mut updated = collections.clone();
        updated.save_stats(stats);
        self.persist(&updated).await?;
        *collections = updated;
        Ok(())
    }
}
