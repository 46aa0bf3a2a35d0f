use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::AgentError;

/// On-disk home of the token/nonce pair
///
/// Both files always reflect the same login response: each write is staged
/// fully (temp file in the destination directory, fsync, chmod) before
/// either target is renamed over, so a failed attempt leaves the pair as
/// it was.
pub struct CredentialStore {
    token_path: PathBuf,
    nonce_path: PathBuf,
}

impl CredentialStore {
    pub fn new(token_path: PathBuf, nonce_path: PathBuf) -> Self {
        Self {
            token_path,
            nonce_path,
        }
    }

    /// The persisted nonce, if any. A zero-length file counts as absent:
    /// a freshly created but empty file is not a prior session.
    pub fn nonce(&self) -> Option<String> {
        match fs::read_to_string(&self.nonce_path) {
            Ok(contents) if !contents.is_empty() => Some(contents),
            _ => None,
        }
    }

    pub fn persist(&self, token: &str, nonce: &str) -> Result<(), AgentError> {
        let staged_token = self.stage(&self.token_path, token)?;
        let staged_nonce = self.stage(&self.nonce_path, nonce)?;
        commit(staged_token, &self.token_path)?;
        commit(staged_nonce, &self.nonce_path)?;
        Ok(())
    }

    fn stage(&self, path: &Path, contents: &str) -> Result<NamedTempFile, AgentError> {
        let persist_err = |source| AgentError::Persist {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir).map_err(persist_err)?;
        staged.write_all(contents.as_bytes()).map_err(persist_err)?;
        staged.as_file().sync_all().map_err(persist_err)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // The token is a bearer credential: owner read/write only.
            staged
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(persist_err)?;
        }

        Ok(staged)
    }
}

fn commit(staged: NamedTempFile, path: &Path) -> Result<(), AgentError> {
    staged.persist(path).map(|_| ()).map_err(|e| AgentError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("token"), dir.path().join("nonce"))
    }

    #[test]
    fn test_missing_nonce_file_is_absent() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).nonce(), None);
    }

    #[test]
    fn test_empty_nonce_file_is_absent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("nonce"), "").unwrap();
        assert_eq!(store_in(&dir).nonce(), None);
    }

    #[test]
    fn test_persist_then_read_back() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.persist("T1", "N1").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("token")).unwrap(), "T1");
        assert_eq!(store.nonce(), Some("N1".to_string()));
    }

    #[test]
    fn test_persist_replaces_the_whole_pair() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.persist("T1", "N1").unwrap();
        store.persist("T2", "N2").unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("token")).unwrap(), "T2");
        assert_eq!(store.nonce(), Some("N2".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_persisted_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        store_in(&dir).persist("T1", "N1").unwrap();

        for name in ["token", "nonce"] {
            let mode = fs::metadata(dir.path().join(name)).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600, "{name} should be 0600");
        }
    }

    #[test]
    fn test_unwritable_target_fails_without_touching_either_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.persist("T1", "N1").unwrap();

        let broken = CredentialStore::new(
            dir.path().join("missing").join("token"),
            dir.path().join("nonce"),
        );
        let err = broken.persist("T2", "N2").unwrap_err();
        assert!(matches!(err, AgentError::Persist { .. }));

        // The earlier pair is intact, including the file the broken store
        // could have written.
        assert_eq!(fs::read_to_string(dir.path().join("token")).unwrap(), "T1");
        assert_eq!(store.nonce(), Some("N1".to_string()));
    }
}
