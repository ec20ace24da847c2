use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which fixed-width or raw field of a record was cut short
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Flag,
    PathLength,
    PathBytes,
    ContentLength,
    ContentBytes,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Flag => "format flag",
            Field::PathLength => "path length",
            Field::PathBytes => "path data",
            Field::ContentLength => "content length",
            Field::ContentBytes => "content data",
        };
        f.write_str(name)
    }
}

/// Errors that abort a whole operation
#[derive(Error, Debug)]
pub enum TzarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Truncated container: short read of {field} at offset {offset}")]
    Truncated { field: Field, offset: u64 },

    #[error("Invalid entry path at offset {0}: not valid UTF-8")]
    InvalidPath(u64),

    #[error("Unknown format flag 0x{0:02x}")]
    UnknownFlag(u8),

    #[error("Not a protected container")]
    NotProtected,

    #[error("Container is already protected")]
    AlreadyProtected,

    #[error("Entry path too long: {0} bytes")]
    PathTooLong(usize),

    #[error("Password required")]
    PasswordRequired,

    #[error("No valid files or directories to archive")]
    NoValidInputs,

    #[error("Output {0} would overwrite the input container")]
    OutputCollision(PathBuf),
}

impl TzarError {
    /// True for stream-structure errors: the scan cannot resynchronize after these
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            TzarError::Truncated { .. }
                | TzarError::InvalidPath(_)
                | TzarError::UnknownFlag(_)
                | TzarError::NotProtected
                | TzarError::AlreadyProtected
        )
    }

    /// True for problems detected before any output was touched
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            TzarError::PasswordRequired | TzarError::NoValidInputs | TzarError::OutputCollision(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TzarError>;

/// A per-item problem. The item is skipped and the operation continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ItemWarning {
    /// Input root does not exist
    Missing(PathBuf),
    /// Neither a regular file nor a directory
    Unsupported(PathBuf),
    /// Path cannot be stored as a UTF-8 string
    NonUtf8Path(PathBuf),
    /// Source file could not be opened or fully read
    Unreadable(PathBuf),
    /// Directory entry collides with an existing non-directory
    TypeConflict(String),
    /// Absolute path or `..` component in a stored path
    UnsafePath(String),
    /// Destination file could not be created or written
    Unwritable(String),
}

impl fmt::Display for ItemWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemWarning::Missing(p) => write!(f, "input path does not exist: {}", p.display()),
            ItemWarning::Unsupported(p) => {
                write!(f, "not a regular file or directory: {}", p.display())
            }
            ItemWarning::NonUtf8Path(p) => write!(f, "skipping non-unicode path {}", p.display()),
            ItemWarning::Unreadable(p) => write!(f, "could not read {}", p.display()),
            ItemWarning::TypeConflict(p) => {
                write!(f, "cannot create directory '{}': a file with that name exists", p)
            }
            ItemWarning::UnsafePath(p) => write!(f, "refusing to extract outside destination: {}", p),
            ItemWarning::Unwritable(p) => write!(f, "could not create output file: {}", p),
        }
    }
}
