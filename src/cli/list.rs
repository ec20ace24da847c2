use crate::container::{open_container, ContainerReader};
use crate::error::Result;
use crate::format::{EntryHeader, FormatFlag};
use serde::Serialize;
use std::io::{Read, Seek};
use std::path::Path;

/// Paths and declared sizes of a container, in stored order
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub flag: FormatFlag,
    pub entries: Vec<EntryHeader>,
}

impl Listing {
    pub fn is_protected(&self) -> bool {
        self.flag.is_protected()
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    pub fn directory_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_directory()).count()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }
}

/// Scan every record, skipping all content
pub fn list_entries<R: Read + Seek>(reader: &mut ContainerReader<R>) -> Result<Listing> {
    let mut entries = Vec::new();
    while let Some(header) = reader.next_header()? {
        reader.skip_content()?;
        entries.push(header);
    }
    Ok(Listing {
        flag: reader.flag(),
        entries,
    })
}

/// List a container file. Works for plain and protected containers alike.
pub fn list_container(path: &Path) -> Result<Listing> {
    let mut reader = open_container(path)?;
    list_entries(&mut reader)
}
