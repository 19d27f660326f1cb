use crate::game::{Game, GameRules, GameState};
use crate::store::{GameStore, StoreError};
use crate::ScopeId;
use chrono::Utc;
use std::collections::HashMap;
use std::result::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slot = Arc<Mutex<Option<Game>>>;

/// Tracks the active game of every scope, backed by a durable [`GameStore`].
///
/// Each scope has its own slot, and all work on a scope goes through [`SessionStore::lock`],
/// which hands out exclusive access to that scope's slot. Different scopes never wait on each
/// other.
pub struct SessionStore<S> {
    store: Arc<S>,
    rules: GameRules,
    // One entry per scope ever seen. Slots are kept after a game ends so every request for a
    // scope keeps locking the same mutex.
    slots: Mutex<HashMap<ScopeId, Slot>>,
}

impl<S: GameStore> SessionStore<S> {
    pub fn new(store: Arc<S>, rules: GameRules) -> SessionStore<S> {
        SessionStore {
            store,
            rules,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Waits for exclusive access to the scope's session.
    pub async fn lock(&self, scope: &ScopeId) -> ScopeSession<'_, S> {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(scope.clone()).or_default())
        };
        ScopeSession {
            scope: scope.clone(),
            store: self.store.as_ref(),
            rules: self.rules,
            slot: slot.lock_owned().await,
        }
    }
}

/// Exclusive access to one scope's session. Dropping it lets the next request for the scope in.
pub struct ScopeSession<'a, S> {
    scope: ScopeId,
    store: &'a S,
    rules: GameRules,
    slot: OwnedMutexGuard<Option<Game>>,
}

impl<S: GameStore> ScopeSession<'_, S> {
    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    /// Makes sure the scope's latest game is cached.
    ///
    /// On a cache miss the store is queried, and a stored in-progress game is rebuilt by
    /// replaying its guesses. If the replay ends the game (for example because the guess limit
    /// was lowered), the finished game is saved right away so the store no longer lists it as in
    /// progress. Either way the rebuilt game is cached.
    pub async fn load(&mut self) -> Result<(), StoreError> {
        if self.active().is_some() {
            return Ok(());
        }
        *self.slot = None;
        let Some(record) = self.store.find_in_progress(&self.scope).await? else {
            return Ok(());
        };
        let game = Game::resume(self.rules, &record);
        tracing::debug!(
            scope = %self.scope,
            game = ?record.id,
            guesses = game.guesses().len(),
            "resumed game from store"
        );
        let finished = game.state() != GameState::InProgress;
        *self.slot = Some(game);
        if finished {
            tracing::warn!(
                scope = %self.scope,
                game = ?record.id,
                state = ?self.current().map(Game::state),
                "stored game ended while being replayed"
            );
            self.save().await?;
        }
        Ok(())
    }

    /// The cached game, if it is in progress. Does not consult the store.
    pub fn active(&mut self) -> Option<&mut Game> {
        self.slot
            .as_mut()
            .filter(|game| game.state() == GameState::InProgress)
    }

    /// Returns the scope's in-progress game, loading it from the store on a cache miss.
    pub async fn find_active(&mut self) -> Result<Option<&mut Game>, StoreError> {
        self.load().await?;
        Ok(self.active())
    }

    /// The cached game, whatever its state, without consulting the store.
    pub fn current(&self) -> Option<&Game> {
        self.slot.as_ref()
    }

    /// Puts a new game in the scope's slot, replacing whatever was cached.
    pub fn insert(&mut self, game: Game) -> &mut Game {
        self.slot.insert(game)
    }

    /// Writes the cached game to the store, assigning it an id on its first save.
    ///
    /// Fails if nothing is cached for the scope.
    pub async fn save(&mut self) -> Result<(), StoreError> {
        let Some(game) = self.slot.as_mut() else {
            return Err(StoreError::Unavailable(format!(
                "no game is cached for {}",
                self.scope
            )));
        };
        let record = game.to_record(&self.scope, Utc::now());
        let id = self.store.save_game(&record).await?;
        game.set_id(id);
        Ok(())
    }

    /// Drops the cached game. The store keeps its record.
    pub fn evict(&mut self) -> Option<Game> {
        self.slot.take()
    }
}
