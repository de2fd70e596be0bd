//! JSON-file session backend.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::persistence::{SessionBackend, SessionSnapshot};

const SNAPSHOT_EXT: &str = "json";

/// Stores each session as `<dir>/<id>.json`.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open a backend rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::Backend(format!("failed to create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a session id.
    ///
    /// Ids are restricted to ASCII alphanumerics, `-` and `_` so they cannot
    /// name anything outside the directory.
    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::Backend(format!("invalid session id {id:?}")));
        }
        Ok(self.dir.join(format!("{id}.{SNAPSHOT_EXT}")))
    }
}

impl SessionBackend for FileBackend {
    fn load(&self, id: &str) -> Result<Option<SessionSnapshot>> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::Backend(format!("failed to read {}: {}", path.display(), e)))?;
        trace!(path = %path.display(), "Session file loaded");
        SessionSnapshot::from_json(&contents).map(Some)
    }

    fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        let path = self.path_for(&snapshot.id)?;
        let contents = snapshot.to_json()?;

        // Readers never observe a partially written snapshot.
        let tmp = path.with_extension(format!("{SNAPSHOT_EXT}.tmp"));
        fs::write(&tmp, contents)
            .map_err(|e| Error::Backend(format!("failed to write {}: {}", tmp.display(), e)))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Backend(format!(
                "failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        debug!(session_id = %snapshot.id, path = %path.display(), "Session saved");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Backend(format!("failed to delete {}: {}", path.display(), e)))?;
        debug!(session_id = %id, "Session file deleted");
        Ok(true)
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            Error::Backend(format!("failed to list {}: {}", self.dir.display(), e))
        })?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == SNAPSHOT_EXT))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }
}
