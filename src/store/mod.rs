pub mod credentials;
pub mod json_store;
pub mod memory;
pub mod schema;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::DrillId;
use crate::session::result::SessionRecord;

/// Errors surfaced by the drill catalog and session history adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    #[error("invalid drill catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid user: {0}")]
    InvalidUser(String),
}

/// Identifies a registered user. Ids start at 1; anything else carries no progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logged-in user, handed explicitly to whatever needs it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserContext {
    pub id: UserId,
    pub name: String,
}

/// Append-only record of finished attempts.
///
/// A drill counts as completed for a user once any session exists for it,
/// whatever its score. Membership of a tier is the catalog's business: the
/// caller passes the drill ids it wants counted, and the `tier` stored on a
/// session is never consulted.
pub trait SessionHistory {
    /// How many of `drills` have at least one session by `user`.
    fn distinct_completed_drills(
        &self,
        user: UserId,
        drills: &BTreeSet<DrillId>,
    ) -> Result<usize, StoreError>;

    /// Persist a finished attempt. Returns only after the record is durable.
    fn append(&self, session: &SessionRecord) -> Result<(), StoreError>;
}

/// Members of `drills` that `user` has a session for, each counted once.
pub(crate) fn count_distinct_drills<'a>(
    sessions: impl IntoIterator<Item = &'a SessionRecord>,
    user: UserId,
    drills: &BTreeSet<DrillId>,
) -> usize {
    sessions
        .into_iter()
        .filter(|s| s.user_id == user && drills.contains(&s.drill_id))
        .map(|s| s.drill_id)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Highest WPM among `user`'s sessions.
pub(crate) fn best_wpm<'a>(
    sessions: impl IntoIterator<Item = &'a SessionRecord>,
    user: UserId,
) -> Option<f64> {
    sessions
        .into_iter()
        .filter(|s| s.user_id == user)
        .map(|s| s.wpm)
        .reduce(f64::max)
}
