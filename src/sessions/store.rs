use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::app_data_dir;
use crate::error::StoreError;
use crate::sessions::{sort_newest_first, InterviewSession};

pub const SESSIONS_FILE: &str = "interview_sessions.json";

/// Read-all / append-one persistence of finished sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Every stored session in insertion order. A missing or unreadable store reads as empty.
    async fn load_all(&self) -> Vec<InterviewSession>;

    async fn append(&self, session: InterviewSession) -> Result<(), StoreError>;
}

/// Sessions for the dashboard, newest first.
pub async fn load_sessions_newest_first(store: &dyn SessionStore) -> Vec<InterviewSession> {
    let mut sessions = store.load_all().await;
    sort_newest_first(&mut sessions);
    sessions
}

/// JSON array of sessions in a single file under the app data directory.
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSessionStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileSessionStore {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn in_data_dir() -> Self {
        Self::new(app_data_dir().join(SESSIONS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    async fn read_raw(&self) -> Option<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Some(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read session store");
                None
            }
        }
    }
}

fn parse_sessions(text: &str) -> Result<Vec<InterviewSession>, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text)
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_all(&self) -> Vec<InterviewSession> {
        let Some(text) = self.read_raw().await else {
            return Vec::new();
        };

        match parse_sessions(&text) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt session store, treating as empty");
                Vec::new()
            }
        }
    }

    async fn append(&self, session: InterviewSession) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut sessions = match self.read_raw().await {
            None => Vec::new(),
            Some(text) => match parse_sessions(&text) {
                Ok(sessions) => sessions,
                Err(e) => {
                    // Keep the unreadable file around instead of overwriting it.
                    let backup = self.path.with_extension("json.corrupt");
                    tracing::warn!(
                        path = %self.path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "Corrupt session store moved aside"
                    );
                    tokio::fs::rename(&self.path, &backup)
                        .await
                        .map_err(|e| self.io_error(e))?;
                    Vec::new()
                }
            },
        };

        let session_id = session.id.clone();
        sessions.push(session);

        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(&sessions)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        tracing::info!(session_id = %session_id, total = sessions.len(), "Saved interview session");
        Ok(())
    }
}

/// Process-local store used by tests and dry runs.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<InterviewSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_all(&self) -> Vec<InterviewSession> {
        self.sessions.lock().clone()
    }

    async fn append(&self, session: InterviewSession) -> Result<(), StoreError> {
        self.sessions.lock().push(session);
        Ok(())
    }
}
