//! Bearer credential store shared by the service client and the query
//! controller.
//!
//! The credential lives in a `tokio::sync::watch` channel so every clone of
//! [`SessionStore`] observes a `set` or `clear` immediately, and presentation
//! code can [`subscribe`](SessionStore::subscribe) to login/logout changes.
//! When opened with a file path the credential is also persisted as a JSON
//! object under the [`TOKEN_KEY`] key so it survives restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::error::SessionError;

/// Key under which the credential is stored in the session file.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    credential: watch::Sender<Option<String>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// A store that is never persisted.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_state(None, None)
    }

    /// Opens a store backed by the JSON file at `path`.
    ///
    /// A missing file means "no credential". The file is not created until the
    /// first [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be read, or
    /// [`SessionError::Json`] if it is not a JSON object.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();
        let stored = read_map(&path)?
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .and_then(non_blank);
        if stored.is_some() {
            tracing::debug!(path = %path.display(), "restored session credential");
        }
        Ok(Self::with_state(stored, Some(path)))
    }

    fn with_state(credential: Option<String>, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(credential);
        Self {
            inner: Arc::new(Inner {
                credential: tx,
                path,
            }),
        }
    }

    /// Current bearer credential, if any.
    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.inner.credential.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.credential.borrow().is_some()
    }

    /// Stores `token` as the current credential. A blank token clears the
    /// session instead.
    ///
    /// The in-memory value changes before the file is written, so a
    /// persistence failure never leaves callers reading the old credential.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the session file cannot be written.
    pub fn set(&self, token: &str) -> Result<(), SessionError> {
        let next = non_blank(token);
        self.replace(next.clone());
        self.persist(next.as_deref())
    }

    /// Removes the current credential.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the session file cannot be rewritten.
    pub fn clear(&self) -> Result<(), SessionError> {
        self.replace(None);
        self.persist(None)
    }

    /// Receiver that is notified whenever the credential changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.credential.subscribe()
    }

    fn replace(&self, next: Option<String>) {
        self.inner.credential.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn persist(&self, token: Option<&str>) -> Result<(), SessionError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };

        // Keep unrelated keys; a corrupt file is simply overwritten.
        let mut map = read_map(path).unwrap_or_default();
        match token {
            Some(t) => {
                map.insert(TOKEN_KEY.to_string(), Value::String(t.to_string()));
            }
            None => {
                if map.remove(TOKEN_KEY).is_none() && !path.exists() {
                    return Ok(());
                }
            }
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SessionError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let body = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            SessionError::Json {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(path, body).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })
    }
}

fn read_map(path: &Path) -> Result<Map<String, Value>, SessionError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str::<Map<String, Value>>(&raw).map_err(|source| SessionError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn non_blank(token: &str) -> Option<String> {
    let trimmed = token.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
