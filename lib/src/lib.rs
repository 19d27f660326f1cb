mod bounded;
mod config;
mod coordinator;
mod data;
mod file_store;
mod game;
mod results;
mod session;
mod stats;
mod store;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use bounded::TimeLimited;
pub use config::*;
pub use coordinator::*;
pub use data::*;
pub use file_store::RonFileGameStore;
pub use game::*;
pub use results::*;
pub use session::{ScopeSession, SessionStore};
pub use stats::*;
pub use store::{GameRecord, GameStore, InMemoryGameStore, StoreError};

/// Identifies the chat context (e.g. a server) that owns at most one active game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> ScopeId {
        ScopeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        ScopeId(id.to_string())
    }
}

impl From<String> for ScopeId {
    fn from(id: String) -> Self {
        ScopeId(id)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
