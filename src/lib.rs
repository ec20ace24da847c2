//! tZAR - sequential file container with optional password scrambling
//!
//! Packs files and directories into a single length-prefixed stream and can
//! scramble entry contents with a keystream derived from a password.
//!
//! ## Container layout
//!
//! ```text
//! [flag: 1]  0x00 plain, 0x01 protected
//! repeated until end of stream:
//!   [path_len: u32 LE][path: UTF-8][content_len: u64 LE][content]
//! ```
//!
//! Zero-length content marks a directory, so a truly empty file cannot be
//! represented; it comes back as a directory.
//!
//! ## Protection
//!
//! ```text
//! password → SHA-256 → 32-byte key
//! content[i] ^= key[i % 32]   (per entry, paths stay in the clear)
//! ```
//!
//! There is no salt, no iteration count and no integrity tag. A wrong
//! password produces garbage content without any error.
//!
//! ## Example
//!
//! ```no_run
//! use tzar::cli::{build_container, extract_container, protect_container, ExtractOptions};
//! use std::path::Path;
//!
//! let built = build_container(Path::new("backup"), &["docs", "notes.txt"]).unwrap();
//! let locked = protect_container(&built.path, Path::new("backup"), "my_secret").unwrap();
//!
//! let options = ExtractOptions {
//!     targets: vec!["docs/readme.md".into()],
//!     password: Some("my_secret".into()),
//!     ..Default::default()
//! };
//! extract_container(&locked.path, &options).unwrap();
//! ```

pub mod cli;
pub mod collect;
pub mod container;
pub mod error;
pub mod format;
pub mod materialize;
pub mod pipeline;
pub mod session;

pub use container::{open_container, ContainerReader, ContainerWriter};
pub use error::{ItemWarning, Result, TzarError};
pub use format::{Entry, EntryHeader, FormatFlag};
pub use session::Session;
