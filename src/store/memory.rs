use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use crate::catalog::DrillId;
use crate::session::result::SessionRecord;
use crate::store::{SessionHistory, StoreError, UserId, best_wpm, count_distinct_drills};

/// Session history held in memory. Used by tests and as a fallback when the
/// data dir cannot be written.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    sessions: Mutex<Vec<SessionRecord>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<SessionRecord>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    pub fn sessions_for(&self, user: UserId) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.lock()?.iter().filter(|s| s.user_id == user).cloned().collect())
    }

    pub fn best_wpm(&self, user: UserId) -> Result<Option<f64>, StoreError> {
        Ok(best_wpm(self.lock()?.iter(), user))
    }
}

impl SessionHistory for MemoryHistory {
    fn distinct_completed_drills(
        &self,
        user: UserId,
        drills: &BTreeSet<DrillId>,
    ) -> Result<usize, StoreError> {
        Ok(count_distinct_drills(self.lock()?.iter(), user, drills))
    }

    fn append(&self, session: &SessionRecord) -> Result<(), StoreError> {
        self.lock()?.push(session.clone());
        Ok(())
    }
}
