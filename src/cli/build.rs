use crate::collect::collect_paths;
use crate::container::create_container;
use crate::error::{ItemWarning, Result, TzarError};
use crate::format::{FormatFlag, PLAIN_EXTENSION};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Outcome of building a container
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub path: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub warnings: Vec<ItemWarning>,
}

impl BuildReport {
    pub fn entries(&self) -> usize {
        self.files + self.directories
    }
}

/// Container path for an output base name: its extension is replaced by `.tzar`
pub fn container_path_for(output_name: &Path) -> PathBuf {
    output_name.with_extension(PLAIN_EXTENSION)
}

/// Archive `roots` into a plain container named after `output_name`.
///
/// Missing or unsupported roots and unreadable files are skipped with a
/// warning. An existing container at the output path is never archived
/// into itself. Fails with `NoValidInputs`, before creating anything, when no
/// root yields an item.
#[instrument(level = "info", skip_all, fields(output = %output_name.display()))]
pub fn build_container<P: AsRef<Path>>(output_name: &Path, roots: &[P]) -> Result<BuildReport> {
    let output = container_path_for(output_name);
    let mut collection = collect_paths(roots)?;
    // a previous container at the output path would be truncated mid-read
    if let Ok(existing) = output.canonicalize() {
        collection.items.retain(|item| {
            let is_output = !item.is_dir
                && item.source.file_name() == existing.file_name()
                && item.source.canonicalize().is_ok_and(|source| source == existing);
            if is_output {
                debug!(path = %item.relative, "skipping the output container");
            }
            !is_output
        });
    }
    if collection.items.is_empty() {
        return Err(TzarError::NoValidInputs);
    }

    let mut report = BuildReport {
        path: output.clone(),
        warnings: collection.warnings,
        ..Default::default()
    };

    let mut writer = create_container(&output, FormatFlag::Plain)?;
    for item in &collection.items {
        if item.is_dir {
            info!(path = %item.relative, "archiving directory");
            writer.write_entry(&item.relative, &[])?;
            report.directories += 1;
            continue;
        }

        let content = match fs::read(&item.source) {
            Ok(content) => content,
            Err(e) => {
                let warning = ItemWarning::Unreadable(item.source.clone());
                warn!(error = %e, "{}", warning);
                report.warnings.push(warning);
                continue;
            }
        };
        if content.is_empty() {
            warn!(path = %item.relative, "empty file will be stored as a directory marker");
        }
        info!(path = %item.relative, bytes = content.len(), "archiving file");
        writer.write_entry(&item.relative, &content)?;
        report.files += 1;
        report.bytes += content.len() as u64;
    }
    writer.finish()?;

    info!(
        path = %output.display(),
        files = report.files,
        directories = report.directories,
        "archiving complete"
    );
    Ok(report)
}
