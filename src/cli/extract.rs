use crate::container::{open_container, ContainerReader};
use crate::error::{ItemWarning, Result, TzarError};
use crate::materialize::{materialize, Outcome};
use crate::pipeline::Key;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Options for the extract command
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Stored paths to extract; empty means everything
    pub targets: Vec<String>,
    /// Needed only for protected containers
    pub password: Option<String>,
    /// Directory entries are written below
    pub dest: PathBuf,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            password: None,
            dest: PathBuf::from("."),
        }
    }
}

/// Counts and per-item problems of an extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractReport {
    /// Entries written or already present on disk
    pub extracted: usize,
    /// Entries not requested; their content was never read
    pub skipped: usize,
    /// Requested entries that could not be materialized
    pub failed: usize,
    /// Requested names that never appeared in the container
    pub unmatched: Vec<String>,
    pub warnings: Vec<ItemWarning>,
}

/// Scan `reader`, materializing requested entries below `dest`.
///
/// Unrequested content is seeked past, so memory use is bounded by the
/// largest requested entry. With a key, requested content is unscrambled
/// before it is written.
pub fn extract_entries<R: Read + Seek>(
    reader: &mut ContainerReader<R>,
    targets: &BTreeSet<String>,
    key: Option<&Key>,
    dest: &Path,
) -> Result<ExtractReport> {
    let mut report = ExtractReport::default();
    let mut matched = BTreeSet::new();

    while let Some(header) = reader.next_header()? {
        if !targets.is_empty() && !targets.contains(&header.path) {
            debug!(path = %header.path, bytes = header.size, "skipping");
            reader.skip_content()?;
            report.skipped += 1;
            continue;
        }

        let mut content = reader.read_content()?;
        if let Some(key) = key {
            key.apply(&mut content);
        }
        matched.insert(header.path.clone());

        match materialize(dest, &header.path, &content)? {
            Outcome::Skipped(warning) => {
                warn!("{}", warning);
                report.warnings.push(warning);
                report.failed += 1;
            }
            _ => report.extracted += 1,
        }
    }

    report.unmatched = targets.difference(&matched).cloned().collect();
    if !targets.is_empty() && matched.is_empty() {
        warn!("no specified entries were found in the container");
    }
    Ok(report)
}

/// Extract all or some entries of a container file.
///
/// A protected container needs `options.password`.
#[instrument(level = "info", skip_all, fields(container = %path.display()))]
pub fn extract_container(path: &Path, options: &ExtractOptions) -> Result<ExtractReport> {
    let mut reader = open_container(path)?;
    let key = if reader.flag().is_protected() {
        let password = options.password.as_deref().ok_or(TzarError::PasswordRequired)?;
        Some(Key::derive(password)?)
    } else {
        None
    };

    let targets: BTreeSet<String> = options.targets.iter().cloned().collect();
    let report = extract_entries(&mut reader, &targets, key.as_ref(), &options.dest)?;
    info!(
        extracted = report.extracted,
        skipped = report.skipped,
        "unarchiving complete"
    );
    Ok(report)
}
