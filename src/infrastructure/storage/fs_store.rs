use crate::domain::storage::Storage;
use crate::domain::{GamesIndex, ResultTable, StoreContents};
use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Result store kept in a single JSON file.
///
/// Writes land in a temporary file next to the store which is then renamed
/// over it, so readers see either the previous or the new contents. There is
/// no lock between processes: concurrent writers race and the last rename
/// wins.
#[derive(Clone)]
pub struct FileSystemStore {
    path: PathBuf,
}

impl FileSystemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Missing store file reads as an empty store.
    pub fn load(&self) -> Result<Option<StoreContents>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write(&self, contents: &StoreContents) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, contents)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        debug!(path = %self.path.display(), tables = contents.tables.len(), "store written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut StoreContents)) -> Result<()> {
        let mut contents = self.load()?.unwrap_or_default();
        apply(&mut contents);
        self.write(&contents)
    }
}

impl Storage for FileSystemStore {
    fn get_table(&self, rom: &str) -> Result<Option<ResultTable>> {
        Ok(self
            .load()?
            .and_then(|mut contents| contents.tables.remove(rom)))
    }

    fn put_table(&self, rom: &str, table: &ResultTable) -> Result<()> {
        self.update(|contents| contents.put_table(rom, table.clone()))
    }

    fn get_games_index(&self) -> Result<Option<GamesIndex>> {
        Ok(self.load()?.and_then(|contents| contents.games))
    }

    fn put_games_index(&self, games: &[String]) -> Result<()> {
        self.update(|contents| contents.put_games_index(games.to_vec()))
    }

    fn replace_all(&self, contents: &StoreContents) -> Result<()> {
        self.write(contents)?;
        info!(
            path = %self.path.display(),
            tables = contents.tables.len(),
            "Store replaced"
        );
        Ok(())
    }
}
