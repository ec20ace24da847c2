use crate::error::{Result, TzarError};
use serde::Serialize;
use std::path::{Component, Path};

/// Extension of a plain container
pub const PLAIN_EXTENSION: &str = "tzar";

/// Extension of a protected container
pub const PROTECTED_EXTENSION: &str = "tzar2";

/// Width of the path length field
pub const PATH_LEN_SIZE: usize = 4;

/// Width of the content length field
pub const CONTENT_LEN_SIZE: usize = 8;

/// Leading byte of every container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FormatFlag {
    #[default]
    Plain,
    Protected,
}

impl FormatFlag {
    pub fn to_byte(self) -> u8 {
        match self {
            FormatFlag::Plain => 0x00,
            FormatFlag::Protected => 0x01,
        }
    }

    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0x00 => Ok(FormatFlag::Plain),
            0x01 => Ok(FormatFlag::Protected),
            other => Err(TzarError::UnknownFlag(other)),
        }
    }

    pub fn is_protected(self) -> bool {
        self == FormatFlag::Protected
    }
}

/// Record metadata: everything before the content bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryHeader {
    pub path: String,
    pub size: u64,
}

impl EntryHeader {
    /// Zero-length content marks a directory
    pub fn is_directory(&self) -> bool {
        self.size == 0
    }
}

/// One archived item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: String,
    pub content: Vec<u8>,
}

impl Entry {
    pub fn directory(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: Vec::new(),
        }
    }

    pub fn file(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Stored paths must stay below the extraction root
pub fn is_safe_relative_path(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bytes() {
        assert_eq!(FormatFlag::Plain.to_byte(), 0);
        assert_eq!(FormatFlag::Protected.to_byte(), 1);
        assert_eq!(FormatFlag::from_byte(1).unwrap(), FormatFlag::Protected);
        assert!(matches!(
            FormatFlag::from_byte(4),
            Err(TzarError::UnknownFlag(4))
        ));
    }

    #[test]
    fn test_header_marks_directories() {
        let file = EntryHeader {
            path: "a.txt".into(),
            size: 3,
        };
        assert!(!file.is_directory());
        let dir = EntryHeader {
            path: "sub".into(),
            size: 0,
        };
        assert!(dir.is_directory());
    }

    #[test]
    fn test_safe_paths() {
        assert!(is_safe_relative_path("a.txt"));
        assert!(is_safe_relative_path("dir/sub/a.txt"));
        assert!(is_safe_relative_path("./dir"));
        assert!(!is_safe_relative_path(""));
        assert!(!is_safe_relative_path("../escape"));
        assert!(!is_safe_relative_path("dir/../../escape"));
        assert!(!is_safe_relative_path("/etc/passwd"));
    }
}
