use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;

use crate::store::schema::Session;

const SESSION_FILE: &str = "session.json";

/// Durable storage for the single active session.
///
/// Cloned handles share one lock so the gateway's compare-and-clear on a
/// 401 (run on a worker thread) serializes with saves from the UI thread.
#[derive(Clone)]
pub struct SessionStore {
    base_dir: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("narat");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            lock: Arc::new(Mutex::new(())),
        })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let _guard = self.guard();
        self.write_file(session)
    }

    fn write_file(&self, session: &Session) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(session)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Returns None when nothing is stored or the file cannot be parsed.
    pub fn load(&self) -> Option<Session> {
        let _guard = self.guard();
        self.read_file()
    }

    fn read_file(&self) -> Option<Session> {
        let content = fs::read_to_string(self.file_path()).ok()?;
        let session: Session = serde_json::from_str(&content).ok()?;
        if session.needs_reset() {
            return None;
        }
        Some(session)
    }

    pub fn token(&self) -> Option<String> {
        self.load().map(|s| s.token)
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.guard();
        self.remove_file()
    }

    fn remove_file(&self) -> Result<()> {
        let path = self.file_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Clear only if the stored token is still `token`. A request that was
    /// sent with an old token must not wipe a session created after it.
    pub fn clear_if(&self, token: &str) -> Result<bool> {
        let _guard = self.guard();
        match self.read_file() {
            Some(current) if current.token == token => {
                self.remove_file()?;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => {
                // Corrupt leftovers count as cleared too.
                self.remove_file()?;
                Ok(true)
            }
        }
    }

    /// Rewrite the cached display name without touching the token.
    pub fn update_display_name(&self, display_name: &str) -> Result<()> {
        let _guard = self.guard();
        if let Some(mut session) = self.read_file() {
            session.display_name = display_name.to_string();
            self.write_file(&session)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::StudyLevel;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_then_load_returns_same_session() {
        let (_dir, store) = make_test_store();
        let session = Session::new("tok-1", "길동", StudyLevel::from("우"));
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn test_clear_then_load_is_absent() {
        let (_dir, store) = make_test_store();
        store.clear().unwrap();
        assert!(store.load().is_none());

        store
            .save(&Session::new("tok", "a", StudyLevel::default()))
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        assert!(!store.file_path().exists());
    }

    #[test]
    fn test_corrupt_file_loads_as_absent() {
        let (_dir, store) = make_test_store();
        fs::write(store.file_path(), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_if_keeps_newer_session() {
        let (_dir, store) = make_test_store();
        store
            .save(&Session::new("new-token", "a", StudyLevel::default()))
            .unwrap();
        assert!(!store.clear_if("old-token").unwrap());
        assert_eq!(store.token().as_deref(), Some("new-token"));
        assert!(store.clear_if("new-token").unwrap());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_update_display_name_preserves_token() {
        let (_dir, store) = make_test_store();
        store
            .save(&Session::new("tok", "old", StudyLevel::from(2i64)))
            .unwrap();
        store.update_display_name("새이름").unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "tok");
        assert_eq!(loaded.display_name, "새이름");
    }

    #[test]
    fn test_legacy_camel_case_keys_load() {
        let (_dir, store) = make_test_store();
        fs::write(
            store.file_path(),
            r#"{"sessionToken":"abc","displayName":"길동","studyLevel":"우"}"#,
        )
        .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.token, "abc");
        assert_eq!(loaded.study_level, StudyLevel::from("우"));
    }
}
