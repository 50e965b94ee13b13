use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths handed to the emulator launcher and used by `fetch-replay` and
/// `package`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub mame_binary: PathBuf,
    pub roms_dir: PathBuf,
    pub inp_dir: PathBuf,
    pub snap_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let mame_binary = if cfg!(windows) { "mame.exe" } else { "mame" };
        Self {
            mame_binary: PathBuf::from(mame_binary),
            roms_dir: PathBuf::from("roms"),
            inp_dir: PathBuf::from("inp"),
            snap_dir: PathBuf::from("snap"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Settings {
    pub const KEYS: [&'static str; 5] = ["mame_binary", "roms_dir", "inp_dir", "snap_dir", "output_dir"];

    /// Reads `path`, or writes the defaults there on first run.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            return Ok(serde_json::from_str(&content)?);
        }

        let settings = Self::default();
        settings.save(path)?;
        fs::create_dir_all(&settings.output_dir)?;
        info!("Created default settings at {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn entries(&self) -> [(&'static str, &Path); 5] {
        [
            (Self::KEYS[0], self.mame_binary.as_path()),
            (Self::KEYS[1], self.roms_dir.as_path()),
            (Self::KEYS[2], self.inp_dir.as_path()),
            (Self::KEYS[3], self.snap_dir.as_path()),
            (Self::KEYS[4], self.output_dir.as_path()),
        ]
    }
}
