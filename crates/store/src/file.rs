//! JSON file-backed stores.
//!
//! The credential file holds `{"access_token": …, "refresh_token": …}`, the
//! session file holds the [`UserInfo`] of the logged-in user. Reads are served
//! from an in-memory copy loaded at open time; every mutation writes through.
//! A missing or corrupt file reads as empty.

use scribe_types::{CredentialStore, Credentials, SessionStore, UserInfo};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

/// One JSON document mirrored in memory.
struct JsonFile<T> {
    path: PathBuf,
    cached: Mutex<Option<T>>,
}

impl<T: Serialize + DeserializeOwned + Clone> JsonFile<T> {
    fn open(path: PathBuf) -> Self {
        let cached = read(&path);
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self) -> Option<T> {
        self.lock().clone()
    }

    fn set(&self, value: T) {
        let mut cached = self.lock();
        if let Err(e) = write(&self.path, &value) {
            tracing::error!(path = %self.path.display(), error = %e, "failed to persist store file");
        }
        *cached = Some(value);
    }

    fn clear(&self) {
        let mut cached = self.lock();
        cached.take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to remove store file");
            }
        }
    }
}

fn read<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read store file");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt store file");
            None
        }
    }
}

fn write<T: Serialize>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, json)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

pub struct FileCredentialStore {
    file: JsonFile<Credentials>,
}

impl FileCredentialStore {
    /// Opens the store at `path`, loading any credentials already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::open(path.into()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn access_token(&self) -> Option<String> {
        self.file.lock().as_ref().map(|c| c.access_token.clone())
    }

    fn refresh_token(&self) -> Option<String> {
        self.file.lock().as_ref().map(|c| c.refresh_token.clone())
    }

    fn set_credentials(&self, access_token: &str, refresh_token: &str) {
        self.file.set(Credentials::new(access_token, refresh_token));
    }

    fn clear_credentials(&self) {
        self.file.clear();
    }

    fn credentials(&self) -> Option<Credentials> {
        self.file.get()
    }
}

/// Keeps the logged-in user across processes, next to the credential file.
pub struct FileSessionStore {
    file: JsonFile<UserInfo>,
}

impl FileSessionStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::open(path.into()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file.path
    }
}

impl SessionStore for FileSessionStore {
    fn set_user(&self, user: UserInfo) {
        self.file.set(user);
    }

    fn user(&self) -> Option<UserInfo> {
        self.file.get()
    }

    fn invalidate_session(&self) {
        self.file.clear();
    }
}
