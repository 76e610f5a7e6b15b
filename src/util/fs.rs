//! Filesystem utilities.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Modification time of `path`.
pub fn last_modified(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("could not stat '{}'", path.display()))
}

/// Newest modification time of `path`.
///
/// For a directory this is the newest time of any file beneath it; a
/// directory without files reports its own time.
pub fn newest_modified(path: &Path) -> Result<SystemTime> {
    let meta =
        fs::metadata(path).with_context(|| format!("could not stat '{}'", path.display()))?;
    if !meta.is_dir() {
        return last_modified(path);
    }

    let mut newest: Option<SystemTime> = None;
    for entry in WalkDir::new(path) {
        let entry =
            entry.with_context(|| format!("could not walk '{}'", path.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = last_modified(entry.path())?;
        newest = Some(newest.map_or(modified, |n| n.max(modified)));
    }

    match newest {
        Some(time) => Ok(time),
        None => meta
            .modified()
            .with_context(|| format!("could not stat '{}'", path.display())),
    }
}

/// Set the modification time of `path`.
pub fn set_last_modified(path: &Path, time: SystemTime) -> Result<()> {
    fs::OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.set_modified(time))
        .with_context(|| format!("could not set the modification time of '{}'", path.display()))
}

/// Whether an artifact built at `artifact` is out of date against `source`.
///
/// Equal timestamps count as up to date.
pub fn is_stale(source: SystemTime, artifact: SystemTime) -> bool {
    source > artifact
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Move `from` to `to`, replacing `to` if present.
///
/// Both paths are expected to be on the same filesystem so the move is a
/// plain rename.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    tracing::debug!("moving {} -> {}", from.display(), to.display());
    fs::rename(from, to)
        .with_context(|| format!("could not move '{}' to '{}'", from.display(), to.display()))
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_dir_all(path)
        .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    Ok(true)
}

/// `path` with `suffix` appended to its final component.
///
/// `build/vocab` with `.old` becomes `build/vocab.old`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, time: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn test_is_stale_tie_break() {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        assert!(!is_stale(t, t));
        assert!(is_stale(t + Duration::from_secs(1), t));
        assert!(!is_stale(t, t + Duration::from_secs(1)));
    }

    #[test]
    fn test_last_modified_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = last_modified(&tmp.path().join("nope")).unwrap_err();
        assert!(format!("{:#}", err).contains("could not stat"));
    }

    #[test]
    fn test_newest_modified_walks_directory() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.rs"), "").unwrap();
        fs::write(src.join("nested/b.rs"), "").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let new = old + Duration::from_secs(60);
        touch(&src.join("a.rs"), old);
        touch(&src.join("nested/b.rs"), new);

        assert_eq!(newest_modified(&src).unwrap(), new);
        assert_eq!(newest_modified(&src.join("a.rs")).unwrap(), old);

        let empty = tmp.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert!(newest_modified(&empty).is_ok());
    }

    #[test]
    fn test_set_last_modified() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("exe");
        fs::write(&file, "").unwrap();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);

        set_last_modified(&file, t).unwrap();
        assert_eq!(last_modified(&file).unwrap(), t);
        assert!(set_last_modified(&tmp.path().join("missing"), t).is_err());
    }

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("build/vocab"), ".old"),
            PathBuf::from("build/vocab.old")
        );
        assert_eq!(
            with_suffix(Path::new("build/vocab.exe"), ".old"),
            PathBuf::from("build/vocab.exe.old")
        );
    }

    #[test]
    fn test_move_file_and_remove_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("build");
        ensure_dir(&dir).unwrap();
        fs::write(dir.join("a"), "x").unwrap();

        move_file(&dir.join("a"), &dir.join("b")).unwrap();
        assert!(!dir.join("a").exists());
        assert_eq!(fs::read_to_string(dir.join("b")).unwrap(), "x");

        assert!(remove_dir_all_if_exists(&dir).unwrap());
        assert!(!remove_dir_all_if_exists(&dir).unwrap());
    }
}
