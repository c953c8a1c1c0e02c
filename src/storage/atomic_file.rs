//! Atomic whole-file replacement.
//!
//! [`save_data`] writes a blob next to its destination under a temporary
//! name, fsyncs it, and renames it over the target. Readers see either the
//! old file or the complete new one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use crate::common::Result;

/// Upper bound (exclusive) of temp-file suffixes.
const SUFFIX_RANGE: u32 = 10_000;

/// Random integer used to name temp files.
pub fn random_suffix() -> u32 {
    rand::thread_rng().gen_range(0..SUFFIX_RANGE)
}

/// `"{path}.tmp.{suffix}"`
fn temp_path(path: &Path, suffix: u32) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".tmp.{suffix}"));
    PathBuf::from(name)
}

/// Replace the contents of `path` with `data` atomically.
///
/// The temp file is created exclusively, so a colliding suffix fails with
/// `AlreadyExists` instead of clobbering another writer's file. On any
/// error the temp file is removed and the target is left untouched.
///
/// # Errors
/// Returns `Error::Io` if creating, writing, syncing, or renaming fails.
pub fn save_data<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let tmp = temp_path(path, random_suffix());

    let mut file = open_exclusive(&tmp)?;
    let written = file.write_all(data).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = data.len(), "saved file");
    Ok(())
}

fn open_exclusive(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o664);
    }
    options.open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");

        save_data(&path, b"Testing write to db").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"Testing write to db");
    }

    #[test]
    fn test_save_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");

        save_data(&path, b"first").unwrap();
        save_data(&path, b"second version").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second version");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");

        save_data(&path, &[0xAB; 8192]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![OsString::from("blob.bin")]);
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("blob.bin");

        let err = save_data(&path, b"data").unwrap_err();
        assert!(matches!(err, crate::common::Error::Io(_)));
    }

    #[test]
    fn test_rename_failure_cleans_up() {
        let dir = tempdir().unwrap();
        // Renaming a file over a non-empty directory fails.
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("inner"), b"x").unwrap();

        assert!(save_data(&target, b"data").is_err());

        let leftovers = fs::read_dir(dir.path())
            .unwrap()
            .filter(|e| {
                let name = e.as_ref().unwrap().file_name();
                name.to_string_lossy().contains(".tmp.")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_temp_path_format() {
        let tmp = temp_path(Path::new("/data/testdb"), 42);
        assert_eq!(tmp, PathBuf::from("/data/testdb.tmp.42"));
    }

    #[test]
    fn test_random_suffix_in_range() {
        for _ in 0..100 {
            assert!(random_suffix() < SUFFIX_RANGE);
        }
    }
}
