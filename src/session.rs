//! Explicit context for a caller that keeps one container open, such as a
//! file browser: remembers the path and whether it is protected instead of
//! holding that in globals.

use crate::cli::extract::{extract_container, ExtractOptions, ExtractReport};
use crate::cli::list::{list_container, Listing};
use crate::cli::protect::{unprotect_container, UnprotectOptions};
use crate::error::{Result, TzarError};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    listing: Listing,
}

impl Session {
    /// List the container and remember its format
    pub fn open(path: &Path) -> Result<Self> {
        let listing = list_container(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            listing,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn is_protected(&self) -> bool {
        self.listing.is_protected()
    }

    /// Re-read the listing after the file changed on disk
    pub fn reload(&mut self) -> Result<()> {
        self.listing = list_container(&self.path)?;
        Ok(())
    }

    /// Extract everything. A protected container goes to its own directory
    /// below `dest`, a plain one directly into `dest`.
    pub fn extract_all(&self, dest: &Path, password: Option<&str>) -> Result<ExtractReport> {
        if self.is_protected() {
            let password = password.ok_or(TzarError::PasswordRequired)?;
            let options = UnprotectOptions {
                password: password.to_string(),
                dest: dest.to_path_buf(),
            };
            return Ok(unprotect_container(&self.path, &options)?.extract);
        }

        let options = ExtractOptions {
            dest: dest.to_path_buf(),
            ..Default::default()
        };
        extract_container(&self.path, &options)
    }

    /// Extract the named entries directly into `dest`
    pub fn extract_selected(
        &self,
        names: &[String],
        dest: &Path,
        password: Option<&str>,
    ) -> Result<ExtractReport> {
        for name in names.iter().filter(|n| !self.listing.contains(n)) {
            debug!(path = %name, "not in the cached listing");
        }
        let options = ExtractOptions {
            targets: names.to_vec(),
            password: password.map(str::to_string),
            dest: dest.to_path_buf(),
        };
        extract_container(&self.path, &options)
    }
}
