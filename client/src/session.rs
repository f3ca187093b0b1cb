use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Single source of truth for the admin session credential.
///
/// A session is authenticated iff a token is present. No expiry is checked
/// here: the server is the sole authority on token validity, and a stored
/// token stays in place until the server rejects it or the operator logs out.
///
/// Stores are injected (`Arc<dyn SessionStore>`) into the HTTP client and the
/// auth gate rather than looked up through any ambient global.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear(&self);

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

/// Credential persisted to a single well-known file, surviving process
/// restarts until explicitly cleared.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    fn set_token(&self, token: &str) {
        let result = open_credential_file(&self.path)
            .and_then(|mut file| file.write_all(token.as_bytes()));
        if let Err(e) = result {
            log::warn!("failed to persist session token to {:?}: {}", self.path, e);
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to clear session file {:?}: {}", self.path, e);
            }
        }
    }
}

#[cfg(unix)]
fn open_credential_file(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_credential_file(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    fn set_token(&self, token: &str) {
        *self.token.write().expect("session lock poisoned") = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write().expect("session lock poisoned") = None;
    }
}
