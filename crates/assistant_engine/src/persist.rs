use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use assistant_logging::assist_debug;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("cannot create download directory {path:?}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("cannot write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Create `dir` (and parents) unless it is already a directory.
pub fn prepare_download_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })
        }
        Err(source) => Err(PersistError::CreateDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

/// Saves downloaded reports into one directory.
///
/// Bytes go to a sibling temp file first and are renamed over the target,
/// so readers see either the previous report or the complete new one.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl ReportStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, PersistError> {
        prepare_download_dir(&self.dir)?;
        let target = self.dir.join(filename);
        let write_err = |source| PersistError::Write {
            path: target.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        staged.write_all(bytes).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        // Rename replaces an earlier report with the same name.
        staged
            .persist(&target)
            .map_err(|err| write_err(err.error))?;
        assist_debug!("Saved {} bytes to {:?}", bytes.len(), target);
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_directory_and_overwrites_same_name() {
        let root = tempfile::tempdir().unwrap();
        let store = ReportStore::new(root.path().join("nested").join("downloads"));

        let first = store.save("report.pdf", b"%PDF-1").unwrap();
        let second = store.save("report.pdf", b"%PDF-2").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"%PDF-2");
        assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[test]
    fn file_in_place_of_directory_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("downloads");
        fs::write(&blocker, b"not a dir").unwrap();

        let err = ReportStore::new(blocker).save("a.pdf", b"x").unwrap_err();
        assert!(matches!(err, PersistError::NotADirectory(_)));
    }
}
