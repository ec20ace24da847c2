use crate::error::Result;
use crate::format::{PLAIN_EXTENSION, PROTECTED_EXTENSION};
use crate::session::Session;
use std::path::Path;

/// Display information about a container file
pub fn show_info(path: &Path) -> Result<String> {
    let session = Session::open(path)?;
    let listing = session.listing();

    let mut output = String::new();

    output.push_str("tZAR Container Information\n");
    output.push_str("==========================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    if listing.is_protected() {
        output.push_str(&format!("Format: protected (.{})\n", PROTECTED_EXTENSION));
    } else {
        output.push_str(&format!("Format: plain (.{})\n", PLAIN_EXTENSION));
    }
    output.push('\n');

    let directories = listing.directory_count();
    output.push_str("Contents:\n");
    output.push_str(&format!("  Entries: {}\n", listing.entries.len()));
    output.push_str(&format!("  Files: {}\n", listing.entries.len() - directories));
    output.push_str(&format!("  Directories: {}\n", directories));
    output.push_str(&format!("  Data size: {}\n", format_size(listing.total_bytes())));

    if listing.is_protected() {
        output.push('\n');
        output.push_str("Content is scrambled; paths and sizes are stored in the clear.\n");
        output.push_str("A wrong password is not detected on extraction.\n");
    }

    Ok(output)
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
