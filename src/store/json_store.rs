use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::catalog::DrillId;
use crate::session::result::SessionRecord;
use crate::store::schema::{SCHEMA_VERSION, SessionHistoryData, UserRegistryData};
use crate::store::{SessionHistory, StoreError, UserContext, UserId, best_wpm, count_distinct_drills};

const SESSIONS_FILE: &str = "sessions.json";
const USERS_FILE: &str = "users.json";

/// File-backed session history and user registry.
///
/// Every read goes to disk, so other handles on the same directory see a
/// write as soon as `append` returns. Writes through one handle are
/// serialized.
pub struct JsonStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = Self::default_dir();
        fs::create_dir_all(&base_dir)?;
        Ok(Self::at(base_dir))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self::at(base_dir))
    }

    fn at(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tierdrill")
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    /// Missing files load as the default; unreadable or corrupt ones are errors
    /// so a later save never clobbers them.
    fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StoreError> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<(), StoreError> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    pub fn load_sessions(&self) -> Result<SessionHistoryData, StoreError> {
        let data: SessionHistoryData = self.load(SESSIONS_FILE)?;
        if data.schema_version != SCHEMA_VERSION {
            warn!(
                found = data.schema_version,
                expected = SCHEMA_VERSION,
                "session history has an unexpected schema version"
            );
        }
        Ok(data)
    }

    pub fn load_users(&self) -> Result<UserRegistryData, StoreError> {
        self.load(USERS_FILE)
    }

    /// Sessions of `user`, oldest first.
    pub fn sessions_for(&self, user: UserId) -> Result<Vec<SessionRecord>, StoreError> {
        let data = self.load_sessions()?;
        Ok(data
            .sessions
            .into_iter()
            .filter(|s| s.user_id == user)
            .collect())
    }

    /// Best recorded WPM of `user`, or `None` before their first session.
    pub fn best_wpm(&self, user: UserId) -> Result<Option<f64>, StoreError> {
        Ok(best_wpm(&self.load_sessions()?.sessions, user))
    }

    /// Create an account. Fails with `InvalidUser` if the name is taken.
    pub fn register(&self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        let _guard = self.lock()?;
        let mut registry = self.load_users()?;
        let user = registry.register(name, password)?;
        self.save(USERS_FILE, &registry)?;
        info!(user = %user.id, name = %user.name, "registered new user");
        Ok(user)
    }

    pub fn login(&self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        let user = self.load_users()?.login(name, password)?;
        debug!(user = %user.id, name = %user.name, "user logged in");
        Ok(user)
    }
}

impl SessionHistory for JsonStore {
    fn distinct_completed_drills(
        &self,
        user: UserId,
        drills: &BTreeSet<DrillId>,
    ) -> Result<usize, StoreError> {
        let data = self.load_sessions()?;
        Ok(count_distinct_drills(&data.sessions, user, drills))
    }

    fn append(&self, session: &SessionRecord) -> Result<(), StoreError> {
        let _guard = self.lock()?;
        let mut data = self.load_sessions()?;
        data.sessions.push(session.clone());
        self.save(SESSIONS_FILE, &data)?;
        debug!(
            user = %session.user_id,
            drill = %session.drill_id,
            tier = %session.tier,
            total = data.sessions.len(),
            "appended session"
        );
        Ok(())
    }
}
