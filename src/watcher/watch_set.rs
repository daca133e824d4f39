//! Watched file set and the parent directories it needs observed.
//!
//! Notification backends observe directories, not single files, so the
//! watch set subscribes to each file's parent and filters events back down
//! to the exact files the user asked for.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use super::WatchError;

/// Set of absolute, cleaned file paths plus their parent directories.
#[derive(Debug, Default, Clone)]
pub struct WatchSet {
    /// Files the user asked to monitor.
    paths: BTreeSet<PathBuf>,
    /// Parent directories of `paths`, registered with the notification source.
    watch_dirs: BTreeSet<PathBuf>,
}

impl WatchSet {
    /// Create an empty watch set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve user-supplied paths into a watch set.
    ///
    /// Fails on the first path that cannot be made absolute, or when no
    /// paths were given at all.
    pub fn resolve<I, P>(paths: I) -> Result<Self, WatchError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut set = Self::new();
        for path in paths {
            set.add_path(path.as_ref())?;
        }

        if set.paths.is_empty() {
            return Err(WatchError::NoPaths);
        }

        Ok(set)
    }

    /// Add a path, storing it under its parent's canonical form.
    ///
    /// Some backends (FSEvents) report real paths for a registered
    /// directory, so the parent is resolved through symlinks when it
    /// exists. A missing parent keeps its lexical form; registering it
    /// fails later.
    fn add_path(&mut self, path: &Path) -> Result<(), WatchError> {
        let path = normalize_path(path)?;

        let (parent, name) = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => {
                return Err(WatchError::InvalidPath {
                    path,
                    reason: "path has no parent directory".to_string(),
                });
            }
        };

        let parent = std::fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
        self.paths.insert(parent.join(name));
        self.watch_dirs.insert(parent);
        Ok(())
    }

    /// Check if an already normalized path is watched.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Watched files in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Directories to register with the notification source.
    pub fn watch_dirs(&self) -> impl Iterator<Item = &Path> {
        self.watch_dirs.iter().map(PathBuf::as_path)
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn dir_count(&self) -> usize {
        self.watch_dirs.len()
    }
}

/// Make a path absolute against the working directory and clean it.
///
/// The same normalization is applied to user input and to incoming event
/// paths so that set membership compares like with like. Event paths come
/// back under the canonical directories registered by the watch set.
pub fn normalize_path(path: &Path) -> Result<PathBuf, WatchError> {
    if path.as_os_str().is_empty() {
        return Err(WatchError::InvalidPath {
            path: path.to_path_buf(),
            reason: "path is empty".to_string(),
        });
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| WatchError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("cannot read working directory: {e}"),
        })?;
        cwd.join(path)
    };

    Ok(clean_path(&absolute))
}

/// Lexically clean a path: drop `.` and fold `..` into its parent.
///
/// Symlinks are not resolved.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                } else if !cleaned.has_root() {
                    // Leading `..` of a relative path has nothing to fold into
                    cleaned.push(component.as_os_str());
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }

    if cleaned.as_os_str().is_empty() {
        cleaned.push(".");
    }

    cleaned
}
