use super::{GamesIndex, ResultTable};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub trait Storage: Send + Sync {
    fn get_table(&self, rom: &str) -> Result<Option<ResultTable>>;
    fn put_table(&self, rom: &str, table: &ResultTable) -> Result<()>;
    fn get_games_index(&self) -> Result<Option<GamesIndex>>;
    fn put_games_index(&self, games: &[String]) -> Result<()>;
    /// Replaces the whole store with `contents` in one step.
    fn replace_all(&self, contents: &StoreContents) -> Result<()>;
}

pub struct StorageKeys;

impl StorageKeys {
    pub const STORE_FILE: &'static str = "store.json";
}

/// Complete image of the store, as written by a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreContents {
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub games: Option<GamesIndex>,
    #[serde(default)]
    pub tables: BTreeMap<String, ResultTable>,
}

impl Default for StoreContents {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreContents {
    pub fn new() -> Self {
        Self {
            last_updated: Utc::now(),
            games: None,
            tables: BTreeMap::new(),
        }
    }

    /// Last write wins.
    pub fn put_table(&mut self, rom: &str, table: ResultTable) {
        if self.tables.insert(rom.to_string(), table).is_some() {
            debug!(rom, "replaced table written earlier in this run");
        }
        self.last_updated = Utc::now();
    }

    pub fn put_games_index(&mut self, games: GamesIndex) {
        self.games = Some(games);
        self.last_updated = Utc::now();
    }
}
