//! Test fixtures for filesystem scenarios.

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// A fixed point in time, `secs` seconds after an arbitrary base.
pub fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000 + secs)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Set the modification time of an existing file.
pub fn set_modified(path: &Path, time: SystemTime) {
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

/// Write a file and give it the modification time `time`.
pub fn write_file_at(path: &Path, contents: impl AsRef<[u8]>, time: SystemTime) {
    write_file(path, contents);
    set_modified(path, time);
}
