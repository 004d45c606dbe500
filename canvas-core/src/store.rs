//! Shared canvas storage keyed by session.
//!
//! [`CanvasStore`] is an explicit handle: clone it to share the same sessions
//! between callers. Each action is applied under the write lock, so
//! transitions on a session are atomic and observed in issue order.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CanvasAction, CanvasConfig, CanvasDocument, CanvasState, CanvasSummary};

/// Default session identifier.
pub const DEFAULT_SESSION: &str = "default";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested session does not exist.
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    /// The store has no data directory to load from.
    #[error("No data directory configured")]
    NoDataDir,
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Thread-safe canvas storage.
///
/// # Example
///
/// ```
/// use studio_canvas_core::store::{CanvasStore, DEFAULT_SESSION};
/// use studio_canvas_core::CanvasAction;
///
/// let store = CanvasStore::new();
/// store
///     .dispatch(DEFAULT_SESSION, CanvasAction::AddLine(vec![0.0, 0.0, 10.0, 10.0]))
///     .unwrap();
/// let summary = store.dispatch(DEFAULT_SESSION, CanvasAction::Undo).unwrap();
/// assert_eq!(summary.future, 1);
/// ```
#[derive(Debug, Clone)]
pub struct CanvasStore {
    sessions: Arc<RwLock<HashMap<String, CanvasState>>>,
    config: CanvasConfig,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasStore {
    /// Create a store with an empty default session and no persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(CanvasConfig::default())
    }

    /// Create a store whose new sessions start from `config`.
    #[must_use]
    pub fn with_config(config: CanvasConfig) -> Self {
        let mut sessions = HashMap::new();
        sessions.insert(DEFAULT_SESSION.to_string(), CanvasState::with_config(&config));
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
            config,
            data_dir: None,
        }
    }

    /// Enable filesystem persistence.
    ///
    /// Sessions are saved as JSON files in `data_dir` after every mutation.
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        self.data_dir = Some(data_dir);
        Ok(self)
    }

    /// Get or create the state for a session.
    #[must_use]
    pub fn get_or_create(&self, session_id: &str) -> CanvasState {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| CanvasState::with_config(&self.config))
            .clone()
    }

    /// Get a session's state if it exists.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<CanvasState> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.get(session_id).cloned()
    }

    /// Apply an action to a session, creating the session if needed.
    ///
    /// Returns a summary of the state after the action.
    ///
    /// # Errors
    ///
    /// Currently infallible but returns `Result` for API consistency.
    pub fn dispatch(
        &self,
        session_id: &str,
        action: CanvasAction,
    ) -> Result<CanvasSummary, StoreError> {
        self.dispatch_all(session_id, std::iter::once(action))
    }

    /// Apply actions to a session in order, persisting once at the end.
    ///
    /// The file is written before the write lock is released, so the
    /// persisted document always matches the last applied batch.
    ///
    /// # Errors
    ///
    /// Currently infallible but returns `Result` for API consistency.
    pub fn dispatch_all(
        &self,
        session_id: &str,
        actions: impl IntoIterator<Item = CanvasAction>,
    ) -> Result<CanvasSummary, StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let state = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| CanvasState::with_config(&self.config));
        state.apply_all(actions);
        self.persist_session(session_id, state);
        Ok(CanvasSummary::from(&*state))
    }

    /// Update a session's state using a closure.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] if the session does not exist.
    pub fn update<F>(&self, session_id: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut CanvasState),
    {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let state = sessions
            .get_mut(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        f(state);
        self.persist_session(session_id, state);
        Ok(())
    }

    /// Drop a session from memory and disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SessionNotFound`] if the session does not exist.
    pub fn remove_session(&self, session_id: &str) -> Result<CanvasState, StoreError> {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let removed = sessions
            .remove(session_id)
            .ok_or_else(|| StoreError::SessionNotFound(session_id.to_string()))?;
        self.delete_session_file(session_id);
        Ok(removed)
    }

    /// Document form of a session, or `None` if it does not exist.
    #[must_use]
    pub fn document(&self, session_id: &str) -> Option<CanvasDocument> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions
            .get(session_id)
            .map(|state| CanvasDocument::from_state(session_id, state, current_timestamp_ms()))
    }

    /// All session IDs held in memory.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        let sessions = self
            .sessions
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.keys().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save a session to disk as JSON. Callers hold the write lock.
    ///
    /// Best-effort: failures are logged. No-op without a data directory.
    fn persist_session(&self, session_id: &str, state: &CanvasState) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let doc = CanvasDocument::from_state(session_id, state, current_timestamp_ms());
        let json = match doc.to_json() {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to serialize session {session_id}: {e}");
                return;
            }
        };
        let path = data_dir.join(format!("{}.json", sanitize_filename(session_id)));
        if let Err(e) = std::fs::write(&path, json) {
            tracing::warn!(
                "Failed to persist session {session_id} to {}: {e}",
                path.display()
            );
        }
    }

    /// Load a single session from disk into memory.
    ///
    /// The restored session has empty undo and redo stacks.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no data directory, or the file doesn't
    /// exist or can't be parsed.
    pub fn load_session_from_disk(&self, session_id: &str) -> Result<(), StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        let path = data_dir.join(format!("{}.json", sanitize_filename(session_id)));
        let contents = std::fs::read_to_string(&path)?;
        let doc = CanvasDocument::from_json(&contents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tracing::debug!("Loaded session {session_id} from {}", path.display());
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        sessions.insert(session_id.to_string(), doc.state);
        Ok(())
    }

    /// List sessions persisted in the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no data directory or it can't be read.
    pub fn persisted_sessions(&self) -> Result<Vec<String>, StoreError> {
        let data_dir = self.data_dir.as_ref().ok_or(StoreError::NoDataDir)?;
        let mut session_ids = Vec::new();
        for entry in std::fs::read_dir(data_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    session_ids.push(stem.to_string());
                }
            }
        }
        session_ids.sort();
        Ok(session_ids)
    }

    /// Remove a session's persisted file.
    ///
    /// No-op if the store has no data directory or the file doesn't exist.
    pub fn delete_session_file(&self, session_id: &str) {
        let Some(ref data_dir) = self.data_dir else {
            return;
        };
        let path = data_dir.join(format!("{}.json", sanitize_filename(session_id)));
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!("Failed to delete session file {}: {e}", path.display());
            }
        }
    }
}

/// Replace any character that is not alphanumeric, `-`, or `_` with `_`.
fn sanitize_filename(session_id: &str) -> String {
    session_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        #[allow(clippy::cast_possible_truncation)]
        {
            d.as_millis() as u64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::layer::ImageRef;

    #[test]
    fn test_new_creates_default_session() {
        let store = CanvasStore::new();
        assert!(store.session_ids().contains(&DEFAULT_SESSION.to_string()));
        let state = store.get(DEFAULT_SESSION).expect("default session");
        assert!(state.layer_state().objects.is_empty());
    }

    #[test]
    fn test_get_nonexistent_returns_none() {
        let store = CanvasStore::new();
        assert!(store.get("nonexistent").is_none());
        assert!(store.document("nonexistent").is_none());
    }

    #[test]
    fn test_sessions_use_store_config() {
        let store = CanvasStore::with_config(CanvasConfig::default().with_max_history(3));
        let state = store.get_or_create("other");
        assert_eq!(state.history().max_history(), 3);
    }

    #[test]
    fn test_dispatch_creates_session() {
        let store = CanvasStore::new();
        let summary = store
            .dispatch("fresh", CanvasAction::AddLine(vec![0.0, 0.0]))
            .expect("dispatch");
        assert_eq!(summary.base_lines, 1);
        assert_eq!(summary.past, 1);
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn test_clones_share_sessions() {
        let store = CanvasStore::new();
        let handle = store.clone();
        handle
            .dispatch(DEFAULT_SESSION, CanvasAction::ResetCanvas)
            .expect("dispatch");
        let state = store.get(DEFAULT_SESSION).expect("exists");
        assert!(state.history().can_undo());
    }

    #[test]
    fn test_update_nonexistent_session_fails() {
        let store = CanvasStore::new();
        let result = store.update("nonexistent", |_| {});
        assert!(matches!(result, Err(StoreError::SessionNotFound(_))));
    }

    #[test]
    fn test_remove_session() {
        let store = CanvasStore::new();
        store.remove_session(DEFAULT_SESSION).expect("remove");
        assert!(store.get(DEFAULT_SESSION).is_none());
        assert!(matches!(
            store.remove_session(DEFAULT_SESSION),
            Err(StoreError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_load_without_data_dir_fails() {
        let store = CanvasStore::new();
        assert!(matches!(
            store.load_session_from_disk(DEFAULT_SESSION),
            Err(StoreError::NoDataDir)
        ));
    }

    // -----------------------------------------------------------------------
    // Persistence tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_persistence_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CanvasStore::new().with_data_dir(dir.path()).expect("store");

        store
            .dispatch_all(
                DEFAULT_SESSION,
                vec![
                    CanvasAction::AddLine(vec![0.0, 0.0, 10.0, 10.0]),
                    CanvasAction::AddImageToStagingArea {
                        bounding_box: Some(Rect::new(0.0, 0.0, 512.0, 512.0)),
                        image: Some(ImageRef::new("outputs/1.png", 512, 512)),
                    },
                    CanvasAction::CommitStagingAreaImage,
                ],
            )
            .expect("dispatch");

        let path = dir.path().join(format!("{DEFAULT_SESSION}.json"));
        assert!(path.exists(), "JSON file should be written on dispatch");

        let store2 = CanvasStore::new().with_data_dir(dir.path()).expect("store2");
        store2
            .load_session_from_disk(DEFAULT_SESSION)
            .expect("load");
        let restored = store2.get(DEFAULT_SESSION).expect("exists");
        let original = store.get(DEFAULT_SESSION).expect("exists");
        assert_eq!(restored.layer_state(), original.layer_state());
        assert!(!restored.history().can_undo());
    }

    #[test]
    fn test_persistence_load_nonexistent_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CanvasStore::new().with_data_dir(dir.path()).expect("store");
        assert!(matches!(
            store.load_session_from_disk("does-not-exist"),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn test_persisted_sessions_and_delete() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CanvasStore::new().with_data_dir(dir.path()).expect("store");
        for name in ["session-a", "session-b"] {
            store
                .dispatch(name, CanvasAction::AddLine(vec![1.0, 1.0]))
                .expect("dispatch");
        }
        let found = store.persisted_sessions().expect("list");
        assert_eq!(found, vec!["session-a".to_string(), "session-b".to_string()]);

        store.remove_session("session-a").expect("remove");
        let found = store.persisted_sessions().expect("list");
        assert_eq!(found, vec!["session-b".to_string()]);
    }

    #[test]
    fn test_concurrent_dispatch_persists_latest_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CanvasStore::with_config(CanvasConfig::default().with_max_history(0))
            .with_data_dir(dir.path())
            .expect("store");

        let workers: Vec<_> = (0..8u8)
            .map(|worker| {
                let handle = store.clone();
                std::thread::spawn(move || {
                    for step in 0..10u8 {
                        handle
                            .dispatch(
                                DEFAULT_SESSION,
                                CanvasAction::AddLine(vec![f32::from(worker), f32::from(step)]),
                            )
                            .expect("dispatch");
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker");
        }

        let reloaded = CanvasStore::new().with_data_dir(dir.path()).expect("store2");
        reloaded
            .load_session_from_disk(DEFAULT_SESSION)
            .expect("load");
        let on_disk = reloaded.get(DEFAULT_SESSION).expect("exists");
        let in_memory = store.get(DEFAULT_SESSION).expect("exists");
        assert_eq!(on_disk.layer_state().objects.len(), 80);
        assert_eq!(on_disk.layer_state(), in_memory.layer_state());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("simple"), "simple");
        assert_eq!(sanitize_filename("with-dash"), "with-dash");
        assert_eq!(sanitize_filename("has/slash"), "has_slash");
        assert_eq!(sanitize_filename("a.b.c"), "a_b_c");
    }
}
