//! Temp-file-then-rename writes.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use quire_types::OperationError;

/// The sibling scratch path for `path`: the same name with `.tmp` appended.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Produce a new version of `path` through `write`, then swap it in.
///
/// `write` receives the scratch path and must leave the complete new file
/// there. The original is replaced only if `write` succeeds and the rename
/// goes through; otherwise the scratch file is removed and the original is
/// left as it was.
pub fn replace_atomically<F>(path: &Path, write: F) -> Result<(), OperationError>
where
    F: FnOnce(&Path) -> Result<(), OperationError>,
{
    let tmp = temp_path(path);
    let outcome = write(&tmp).and_then(|()| std::fs::rename(&tmp, path).map_err(Into::into));
    if let Err(err) = outcome {
        match std::fs::remove_file(&tmp) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %tmp.display(), error = %e, "could not remove scratch file"),
        }
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/data/report.xlsx")),
            PathBuf::from("/data/report.xlsx.tmp")
        );
    }

    #[test]
    fn success_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"old").unwrap();

        replace_atomically(&path, |tmp| {
            std::fs::write(tmp, b"new")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn failure_mid_write_leaves_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"original bytes").unwrap();

        let err = replace_atomically(&path, |tmp| {
            let mut file = std::fs::File::create(tmp)?;
            file.write_all(b"half a fi")?;
            Err(OperationError::io("disk full"))
        })
        .unwrap_err();

        assert_eq!(err.to_string(), "Error: disk full");
        assert_eq!(std::fs::read(&path).unwrap(), b"original bytes");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn failure_before_any_write_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"keep").unwrap();

        assert!(replace_atomically(&path, |_| Err(OperationError::format("bad"))).is_err());
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }
}
