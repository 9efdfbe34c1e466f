use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;

const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock on the data directory, released on drop.
struct DirLock {
    file: File,
}

impl DirLock {
    fn acquire(dir: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))?;
        fs2::FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

/// Replace `dir/file_name` with `bytes` without ever exposing a partial file.
///
/// The bytes go to a temporary file in the same directory, are synced, and the
/// temporary file is renamed over the target. On any error the temporary file
/// is removed and the previous contents stay in place.
pub(crate) fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
    let _lock = DirLock::acquire(dir)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dir.join(file_name)).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        write_atomic(tmp.path(), "goals.json", b"[1]").unwrap();
        write_atomic(tmp.path(), "goals.json", b"[2]").unwrap();
        let contents = std::fs::read_to_string(tmp.path().join("goals.json")).unwrap();
        assert_eq!(contents, "[2]");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let tmp = TempDir::new().unwrap();
        write_atomic(tmp.path(), "goals.json", b"[]").unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let tmp = TempDir::new().unwrap();
        write_atomic(tmp.path(), "goals.json", b"[1]").unwrap();
        // A directory in the way makes the final rename fail.
        std::fs::create_dir(tmp.path().join("blocked")).unwrap();
        std::fs::write(tmp.path().join("blocked").join("x"), b"x").unwrap();
        assert!(write_atomic(tmp.path(), "blocked", b"[2]").is_err());
        let contents = std::fs::read_to_string(tmp.path().join("goals.json")).unwrap();
        assert_eq!(contents, "[1]");
    }
}
