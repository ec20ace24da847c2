//! Input traversal: turns requested root paths into an ordered list of
//! items with container-relative names.

use crate::error::{ItemWarning, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file or directory selected for archiving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedItem {
    /// Where to read the item from
    pub source: PathBuf,
    /// Name stored in the container, `/`-separated
    pub relative: String,
    pub is_dir: bool,
}

/// Traversal result: items in archive order plus skipped inputs
#[derive(Debug, Default)]
pub struct Collection {
    pub items: Vec<CollectedItem>,
    pub warnings: Vec<ItemWarning>,
}

impl Collection {
    fn skip(&mut self, warning: ItemWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn push(&mut self, source: &Path, relative: &Path, is_dir: bool) {
        match container_path(relative) {
            Some(relative) => {
                debug!(path = %relative, is_dir, "collected");
                self.items.push(CollectedItem {
                    source: source.to_path_buf(),
                    relative,
                    is_dir,
                });
            }
            None => self.skip(ItemWarning::NonUtf8Path(source.to_path_buf())),
        }
    }
}

/// Walk each root in argument order and concatenate the results.
///
/// A directory root contributes itself followed by its descendants in
/// pre-order, siblings sorted by name. All descendants are named relative to
/// the root's base (its parent, or the working directory). A root that is its
/// own base, such as `.`, contributes only its descendants. No deduplication
/// across roots.
pub fn collect_paths<P: AsRef<Path>>(roots: &[P]) -> Result<Collection> {
    let mut collection = Collection::default();
    for root in roots {
        collect_root(root.as_ref(), &mut collection)?;
    }
    Ok(collection)
}

fn collect_root(root: &Path, collection: &mut Collection) -> Result<()> {
    let meta = match fs::metadata(root) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            collection.skip(ItemWarning::Missing(root.to_path_buf()));
            return Ok(());
        }
        Err(_) => {
            collection.skip(ItemWarning::Unreadable(root.to_path_buf()));
            return Ok(());
        }
    };
    if !meta.is_file() && !meta.is_dir() {
        collection.skip(ItemWarning::Unsupported(root.to_path_buf()));
        return Ok(());
    }

    let base = base_for(root)?;
    let absolute = absolute_path(root)?;
    // a root that is its own base (`.`) has no entry; children are named from it
    let root_name = match absolute.strip_prefix(&base) {
        Ok(rel) if !is_current_dir(rel) => Some(rel.to_path_buf()),
        _ => None,
    };

    if meta.is_file() {
        let name = root_name.unwrap_or_else(|| root_display_name(root, &absolute));
        collection.push(root, &name, false);
        return Ok(());
    }

    let child_prefix = match root_name {
        Some(name) => {
            collection.push(root, &name, true);
            name
        }
        None => {
            debug!(root = %root.display(), "root is the base directory, storing its contents only");
            PathBuf::new()
        }
    };

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                collection.skip(ItemWarning::Unreadable(path));
                continue;
            }
        };

        let path = entry.path();
        let relative = match path.strip_prefix(root) {
            Ok(rel) => child_prefix.join(rel),
            Err(_) => continue,
        };

        // links are classified by their target but never descended into
        let file_type = if entry.path_is_symlink() {
            match fs::metadata(path) {
                Ok(meta) => meta.file_type(),
                Err(_) => {
                    collection.skip(ItemWarning::Unsupported(path.to_path_buf()));
                    continue;
                }
            }
        } else {
            entry.file_type()
        };

        if file_type.is_file() {
            collection.push(path, &relative, false);
        } else if file_type.is_dir() {
            collection.push(path, &relative, true);
        } else {
            collection.skip(ItemWarning::Unsupported(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Canonical parent of `root`, or the working directory when it has none
fn base_for(root: &Path) -> Result<PathBuf> {
    let base = match root.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(base.canonicalize()?)
}

/// Absolute form of `path` with only its parent resolved, so a symlinked
/// final component keeps its own name
fn absolute_path(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    let absolute = match (parent, path.file_name()) {
        (Some(parent), Some(name)) => parent.canonicalize()?.join(name),
        (None, Some(name)) => std::env::current_dir()?.canonicalize()?.join(name),
        _ => path.canonicalize()?,
    };
    Ok(absolute)
}

fn is_current_dir(path: &Path) -> bool {
    path.components().all(|c| c == Component::CurDir)
}

fn root_display_name(root: &Path, absolute: &Path) -> PathBuf {
    absolute
        .file_name()
        .or_else(|| root.file_name())
        .map(PathBuf::from)
        .unwrap_or_else(|| root.to_path_buf())
}

/// `/`-joined form of a relative path, `None` if not valid UTF-8
fn container_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => parts.push(other.as_os_str().to_str()?),
        }
    }
    Some(parts.join("/"))
}
