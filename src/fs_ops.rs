//! Filesystem operations used by the mover and the purger.
//!
//! Everything the retry loops do to the disk goes through [`FileSystem`], so
//! the loops can be exercised against a wrapper that refuses some paths.

use crate::config::OverwritePolicy;
use crate::platform;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Kind of a filesystem entry. Symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// A file or directory found below a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// Number of path components, used to order directories deepest-first
    pub fn depth(&self) -> usize {
        self.path.components().count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// The destination already existed and the policy kept it
    Skipped,
}

/// Counters from a recursive copy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Who gets write access from [`FileSystem::set_writable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Owner,
    Everyone,
}

pub trait FileSystem {
    /// Every entry strictly below `root`, parents before children.
    /// A missing or unreadable root yields nothing.
    fn list_entries(&self, root: &Path) -> Vec<Entry>;

    /// Whether anything, including a dangling symlink, is at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Move one entry, creating the parents of `dest` as needed.
    fn move_entry(&self, src: &Path, dest: &Path, policy: OverwritePolicy)
        -> io::Result<MoveOutcome>;

    /// Copy `src` into `dest`, keeping structure, permissions and mtimes.
    /// Each source file is removed once its copy has been synced to disk.
    fn copy_entry_recursive(
        &self,
        src: &Path,
        dest: &Path,
        policy: OverwritePolicy,
    ) -> io::Result<CopyStats>;

    /// Remove a file, symlink or whole directory tree. Missing paths are fine.
    fn remove_entry(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory only if it is empty.
    fn remove_empty_dir(&self, path: &Path) -> io::Result<()>;

    /// Grant write access on `path` and everything below it.
    fn set_writable(&self, path: &Path, access: Access) -> io::Result<()>;

    /// Clear user and system immutable flags on `path` and everything below it.
    fn clear_immutable_flags(&self, path: &Path) -> io::Result<()>;
}

/// The real disk
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl FileSystem for LocalFileSystem {
    fn list_entries(&self, root: &Path) -> Vec<Entry> {
        WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                    None
                }
            })
            .map(|entry| {
                let file_type = entry.file_type();
                let kind = if file_type.is_symlink() {
                    EntryKind::Symlink
                } else if file_type.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                };
                Entry {
                    path: entry.into_path(),
                    kind,
                }
            })
            .collect()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn move_entry(
        &self,
        src: &Path,
        dest: &Path,
        policy: OverwritePolicy,
    ) -> io::Result<MoveOutcome> {
        if self.exists(dest) {
            match policy {
                OverwritePolicy::NoClobber => return Ok(MoveOutcome::Skipped),
                OverwritePolicy::Overwrite => self.remove_entry(dest)?,
            }
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        match fs::rename(src, dest) {
            Ok(()) => Ok(MoveOutcome::Moved),
            Err(e) => {
                // Most likely a cross-device move; copy then drop the source.
                debug!(
                    "Rename {} -> {} failed ({}), copying instead",
                    src.display(),
                    dest.display(),
                    e
                );
                let stats = self.copy_entry_recursive(src, dest, policy)?;
                if fs::symlink_metadata(src).map(|m| m.is_dir()).unwrap_or(false) {
                    remove_empty_dirs(src);
                }
                if stats.failed > 0 || stats.skipped > 0 || fs::symlink_metadata(src).is_ok() {
                    return Err(io::Error::other(format!(
                        "{} could only be partially moved",
                        src.display()
                    )));
                }
                Ok(MoveOutcome::Moved)
            }
        }
    }

    fn copy_entry_recursive(
        &self,
        src: &Path,
        dest: &Path,
        policy: OverwritePolicy,
    ) -> io::Result<CopyStats> {
        let mut stats = CopyStats::default();

        for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read {} during copy: {}", src.display(), e);
                    stats.failed += 1;
                    continue;
                }
            };
            let relative = entry.path().strip_prefix(src).unwrap_or(Path::new(""));
            let target = if relative.as_os_str().is_empty() {
                dest.to_path_buf()
            } else {
                dest.join(relative)
            };

            if entry.file_type().is_dir() {
                if let Err(e) = fs::create_dir_all(&target) {
                    warn!("Failed to create {}: {}", target.display(), e);
                    stats.failed += 1;
                }
                continue;
            }

            if fs::symlink_metadata(&target).is_ok() {
                match policy {
                    OverwritePolicy::NoClobber => {
                        debug!("Keeping existing {}", target.display());
                        stats.skipped += 1;
                        continue;
                    }
                    OverwritePolicy::Overwrite => {
                        if let Err(e) = self.remove_entry(&target) {
                            warn!("Failed to replace {}: {}", target.display(), e);
                            stats.failed += 1;
                            continue;
                        }
                    }
                }
            }

            let copied = if entry.file_type().is_symlink() {
                copy_symlink(entry.path(), &target)
            } else {
                copy_file_durable(entry.path(), &target)
            };
            match copied.and_then(|()| fs::remove_file(entry.path())) {
                Ok(()) => stats.copied += 1,
                Err(e) => {
                    warn!(
                        "Failed to copy {} -> {}: {}",
                        entry.path().display(),
                        target.display(),
                        e
                    );
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }

    fn remove_entry(&self, path: &Path) -> io::Result<()> {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        match removed {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn remove_empty_dir(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }

    fn set_writable(&self, path: &Path, access: Access) -> io::Result<()> {
        let mut failed = 0u64;
        for entry in WalkDir::new(path).follow_links(false) {
            let Ok(entry) = entry else {
                failed += 1;
                continue;
            };
            if entry.file_type().is_symlink() {
                continue;
            }
            let result = entry
                .metadata()
                .map_err(io::Error::from)
                .and_then(|metadata| platform::make_writable(entry.path(), &metadata, access));
            if let Err(e) = result {
                debug!("Cannot make {} writable: {}", entry.path().display(), e);
                failed += 1;
            }
        }

        if failed > 0 {
            Err(io::Error::other(format!(
                "{} entries under {} could not be made writable",
                failed,
                path.display()
            )))
        } else {
            Ok(())
        }
    }

    fn clear_immutable_flags(&self, path: &Path) -> io::Result<()> {
        platform::clear_immutable_flags(path)
    }
}

/// Copy one regular file, keep its mtime and flush it to disk.
fn copy_file_durable(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(src, dest)?;

    let modified = fs::metadata(src)?.modified()?;
    // fs::copy carries the permissions over, so the copy may be read-only.
    let file = fs::OpenOptions::new()
        .write(true)
        .open(dest)
        .or_else(|_| fs::File::open(dest))?;
    if let Err(e) = file.set_modified(modified) {
        debug!("Cannot keep mtime of {}: {}", dest.display(), e);
    }
    file.sync_all()
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(fs::read_link(src)?, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _dest: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symlink {}", src.display()),
    ))
}

/// Remove every empty directory under `root`, deepest first, then `root` itself.
fn remove_empty_dirs(root: &Path) {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
    for dir in dirs {
        if let Err(e) = fs::remove_dir(&dir) {
            debug!("Keeping {}: {}", dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn relative(root: &Path, entries: &[Entry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_list_entries_parents_first() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("b/c")).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("b/c/d.txt"), b"d").unwrap();

        let entries = LocalFileSystem.list_entries(root);

        assert_eq!(relative(root, &entries), vec!["a.txt", "b", "b/c", "b/c/d.txt"]);
        assert_eq!(entries[0].kind, EntryKind::File);
        assert!(entries[1].is_dir());
        assert!(entries[2].depth() > entries[1].depth());
    }

    #[test]
    fn test_list_entries_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(LocalFileSystem.list_entries(&temp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_exists_sees_files_dirs_and_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("f"), b"f").unwrap();

        assert!(LocalFileSystem.exists(temp.path()));
        assert!(LocalFileSystem.exists(&temp.path().join("f")));
        assert!(!LocalFileSystem.exists(&temp.path().join("missing")));
    }

    #[test]
    fn test_move_entry_creates_parents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("note.txt");
        let dest = temp.path().join("trash/deep/note.txt");
        fs::write(&src, b"hello").unwrap();

        let outcome = LocalFileSystem
            .move_entry(&src, &dest, OverwritePolicy::NoClobber)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved);
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"hello");
    }

    #[test]
    fn test_move_entry_no_clobber_keeps_both() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        let dest = temp.path().join("dest.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        let outcome = LocalFileSystem
            .move_entry(&src, &dest, OverwritePolicy::NoClobber)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Skipped);
        assert_eq!(fs::read(&src).unwrap(), b"new");
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_move_entry_overwrite_replaces() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src.txt");
        let dest = temp.path().join("dest.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        let outcome = LocalFileSystem
            .move_entry(&src, &dest, OverwritePolicy::Overwrite)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Moved);
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_copy_recursive_removes_source_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(src.join("nested/empty")).unwrap();
        fs::write(src.join("top.txt"), b"top").unwrap();
        fs::write(src.join("nested/inner.txt"), b"inner").unwrap();

        let stats = LocalFileSystem
            .copy_entry_recursive(&src, &dest, OverwritePolicy::NoClobber)
            .unwrap();

        assert_eq!(stats, CopyStats { copied: 2, skipped: 0, failed: 0 });
        assert_eq!(fs::read(dest.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(dest.join("nested/inner.txt")).unwrap(), b"inner");
        assert!(dest.join("nested/empty").is_dir());
        assert!(!src.join("top.txt").exists());
        assert!(!src.join("nested/inner.txt").exists());
        // Directories stay behind for the caller to sweep.
        assert!(src.join("nested/empty").is_dir());
    }

    #[test]
    fn test_copy_recursive_keeps_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        let file = src.join("old.txt");
        fs::write(&file, b"old").unwrap();
        let stamp = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&file)
            .unwrap()
            .set_modified(stamp)
            .unwrap();

        LocalFileSystem
            .copy_entry_recursive(&src, &dest, OverwritePolicy::NoClobber)
            .unwrap();

        let copied = fs::metadata(dest.join("old.txt")).unwrap().modified().unwrap();
        assert_eq!(copied, stamp);
    }

    #[test]
    fn test_copy_recursive_no_clobber_skips_existing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dest = temp.path().join("dest");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dest).unwrap();
        fs::write(src.join("same.txt"), b"source").unwrap();
        fs::write(dest.join("same.txt"), b"trash").unwrap();

        let stats = LocalFileSystem
            .copy_entry_recursive(&src, &dest, OverwritePolicy::NoClobber)
            .unwrap();

        assert_eq!(stats.skipped, 1);
        assert_eq!(fs::read(src.join("same.txt")).unwrap(), b"source");
        assert_eq!(fs::read(dest.join("same.txt")).unwrap(), b"trash");
    }

    #[test]
    fn test_remove_entry_handles_missing_and_trees() {
        let temp = TempDir::new().unwrap();
        let tree = temp.path().join("tree");
        fs::create_dir_all(tree.join("a/b")).unwrap();
        fs::write(tree.join("a/b/c.txt"), b"c").unwrap();

        LocalFileSystem.remove_entry(&tree).unwrap();
        assert!(!tree.exists());
        LocalFileSystem.remove_entry(&tree).unwrap();
    }

    #[test]
    fn test_remove_empty_dir_refuses_full_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("full");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("x"), b"x").unwrap();

        assert!(LocalFileSystem.remove_empty_dir(&dir).is_err());
        assert!(dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_remove_empty_dirs_keeps_occupied_branches() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("empty/deeper")).unwrap();
        fs::create_dir_all(root.join("full")).unwrap();
        fs::write(root.join("full/keep.txt"), b"k").unwrap();

        remove_empty_dirs(&root);

        assert!(!root.join("empty").exists());
        assert!(root.join("full/keep.txt").exists());
        assert!(root.exists());
    }

    #[test]
    fn test_set_writable_grants_owner_write() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let file = temp.path().join("locked.txt");
        fs::write(&file, b"x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o444)).unwrap();

        LocalFileSystem.set_writable(temp.path(), Access::Owner).unwrap();

        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o200, 0o200);
    }

    #[cfg(unix)]
    #[test]
    fn test_set_writable_everyone() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("dir");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o500)).unwrap();

        LocalFileSystem.set_writable(&dir, Access::Everyone).unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o777);
    }
}
