use crate::cli::extract::{extract_entries, ExtractReport};
use crate::container::{create_container, open_container, ContainerReader, ContainerWriter};
use crate::error::{Field, Result, TzarError};
use crate::format::{FormatFlag, PROTECTED_EXTENSION};
use crate::pipeline::Key;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for the unprotect command
#[derive(Debug, Clone)]
pub struct UnprotectOptions {
    pub password: String,
    /// Parent of the output directory
    pub dest: PathBuf,
}

impl Default for UnprotectOptions {
    fn default() -> Self {
        Self {
            password: String::new(),
            dest: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtectReport {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnprotectReport {
    pub output_dir: PathBuf,
    #[serde(flatten)]
    pub extract: ExtractReport,
}

/// Protected container path for an output base name
pub fn protected_path_for(output_name: &Path) -> PathBuf {
    output_name.with_extension(PROTECTED_EXTENSION)
}

/// Re-emit every record of `reader` into `writer` with its content passed
/// through the keystream. Paths are copied unchanged.
///
/// Returns the number of records and content bytes transformed.
pub fn transform_entries<R: Read + Seek, W: Write>(
    reader: &mut ContainerReader<R>,
    writer: &mut ContainerWriter<W>,
    key: &Key,
) -> Result<(usize, u64)> {
    let mut bytes = 0u64;
    let mut count = 0usize;
    while let Some(mut entry) = reader.next_entry()? {
        key.apply(&mut entry.content);
        writer.write_entry(&entry.path, &entry.content)?;
        debug!(path = %entry.path, bytes = entry.content.len(), "transformed");
        bytes += entry.content.len() as u64;
        count += 1;
    }
    Ok((count, bytes))
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Scramble a plain container into `<output_name>.tzar2`.
///
/// No integrity tag is added: a wrong password on the way back goes
/// undetected.
#[instrument(level = "info", skip_all, fields(container = %input.display()))]
pub fn protect_container(input: &Path, output_name: &Path, password: &str) -> Result<ProtectReport> {
    let key = Key::derive(password)?;
    let output = protected_path_for(output_name);
    if same_file(input, &output) {
        return Err(TzarError::OutputCollision(output));
    }

    let mut reader = open_container(input)?;
    if reader.flag().is_protected() {
        return Err(TzarError::AlreadyProtected);
    }

    let mut writer = create_container(&output, FormatFlag::Protected)?;
    let (entries, bytes) = transform_entries(&mut reader, &mut writer, &key)?;
    writer.finish()?;

    info!(path = %output.display(), entries, "encryption complete");
    Ok(ProtectReport {
        path: output,
        entries,
        bytes,
    })
}

/// Unscramble a protected container into a fresh directory named after its
/// file stem, below `options.dest`.
#[instrument(level = "info", skip_all, fields(container = %input.display()))]
pub fn unprotect_container(input: &Path, options: &UnprotectOptions) -> Result<UnprotectReport> {
    let key = Key::derive(&options.password)?;

    let mut reader = match open_container(input) {
        Ok(reader) if reader.flag().is_protected() => reader,
        Ok(_)
        | Err(TzarError::UnknownFlag(_))
        | Err(TzarError::Truncated {
            field: Field::Flag,
            ..
        }) => return Err(TzarError::NotProtected),
        Err(e) => return Err(e),
    };

    let stem = input
        .file_stem()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("extracted"));
    let output_dir = options.dest.join(stem);
    fs::create_dir_all(&output_dir)?;

    let extract = extract_entries(&mut reader, &BTreeSet::new(), Some(&key), &output_dir)?;
    info!(
        path = %output_dir.display(),
        extracted = extract.extracted,
        "decryption complete"
    );
    Ok(UnprotectReport { output_dir, extract })
}
