use crate::error::{ItemWarning, Result};
use crate::format::is_safe_relative_path;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// What happened to one entry on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    CreatedDirectory,
    ExistingDirectory,
    WroteFile(u64),
    Skipped(ItemWarning),
}

/// Write one entry below `dest`.
///
/// Parent directories are created first. Empty content is a directory
/// request: an existing directory is left alone, an existing non-directory
/// is a type conflict. Non-empty content truncates and rewrites the file.
/// Only a failing write to an already opened file is fatal.
pub fn materialize(dest: &Path, relative: &str, content: &[u8]) -> Result<Outcome> {
    if !is_safe_relative_path(relative) {
        return Ok(Outcome::Skipped(ItemWarning::UnsafePath(relative.to_string())));
    }

    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
        if fs::create_dir_all(parent).is_err() {
            return Ok(Outcome::Skipped(ItemWarning::Unwritable(relative.to_string())));
        }
    }

    if content.is_empty() {
        return Ok(match fs::metadata(&target) {
            Ok(meta) if meta.is_dir() => {
                debug!(path = relative, "directory already exists");
                Outcome::ExistingDirectory
            }
            Ok(_) => Outcome::Skipped(ItemWarning::TypeConflict(relative.to_string())),
            Err(_) => match fs::create_dir_all(&target) {
                Ok(()) => {
                    info!(path = relative, "extracted directory");
                    Outcome::CreatedDirectory
                }
                Err(_) => Outcome::Skipped(ItemWarning::Unwritable(relative.to_string())),
            },
        });
    }

    let mut file = match File::create(&target) {
        Ok(file) => file,
        Err(_) => return Ok(Outcome::Skipped(ItemWarning::Unwritable(relative.to_string()))),
    };
    file.write_all(content)?;
    file.flush()?;
    info!(path = relative, bytes = content.len(), "extracted file");
    Ok(Outcome::WroteFile(content.len() as u64))
}
