//! Replay bundles and submission packages.
//!
//! A replay bundle is a zip archive whose first file entry is the recorded
//! `.inp`. A submission is the reverse: the recording zipped on its own into
//! the output directory, with the chosen screenshot copied next to it under
//! the same stem.

use crate::error::{ArcadeError, Result};
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Files written by [`package_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub archive: PathBuf,
    pub screenshot: Option<PathBuf>,
}

/// Writes the first file entry of `bundle` to `target` and returns the
/// entry's name inside the archive.
pub fn extract_replay(bundle: &[u8], target: &Path) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(bundle))?;

    let index = (0..archive.len())
        .find(|&i| archive.by_index(i).map(|e| e.is_file()).unwrap_or(false))
        .ok_or_else(|| ArcadeError::Format("replay bundle has no file entry".to_string()))?;
    let mut entry = archive.by_index(index)?;
    let name = entry.name().to_string();

    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, &data)?;

    info!(entry = %name, target = %target.display(), bytes = data.len(), "Replay extracted");
    Ok(name)
}

/// Zips `inp` (resolved against `inp_dir` unless absolute) into
/// `output_dir/<stem>.zip` and copies `screenshot` to
/// `output_dir/<stem>.<ext>`.
pub fn package_submission(
    inp_dir: &Path,
    output_dir: &Path,
    inp: &Path,
    screenshot: Option<&Path>,
) -> Result<Submission> {
    let source = inp_dir.join(inp);
    if !source.is_file() {
        return Err(ArcadeError::NotFound(format!("recording {}", source.display())));
    }
    let (Some(entry_name), Some(stem)) = (source.file_name(), source.file_stem()) else {
        return Err(ArcadeError::Format(format!("not a file name: {}", source.display())));
    };
    let entry_name = entry_name.to_string_lossy().into_owned();
    let stem = stem.to_string_lossy();

    fs::create_dir_all(output_dir)?;
    let archive = output_dir.join(format!("{stem}.zip"));

    let data = fs::read(&source)?;
    let mut zip = ZipWriter::new(File::create(&archive)?);
    zip.start_file(
        entry_name,
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
    )?;
    zip.write_all(&data)?;
    zip.finish()?;
    info!("Packaged {} into {}", source.display(), archive.display());

    let screenshot = match screenshot {
        Some(path) => {
            if !path.is_file() {
                return Err(ArcadeError::NotFound(format!("screenshot {}", path.display())));
            }
            let copied = match path.extension() {
                Some(ext) => output_dir.join(format!("{stem}.{}", ext.to_string_lossy())),
                None => output_dir.join(stem.as_ref()),
            };
            fs::copy(path, &copied)?;
            info!("Copied screenshot to {}", copied.display());
            Some(copied)
        }
        None => {
            warn!("No screenshot given, only the recording was packaged");
            None
        }
    };

    Ok(Submission { archive, screenshot })
}
