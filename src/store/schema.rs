use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::result::SessionRecord;
use crate::store::credentials::{hash_password, verify_password};
use crate::store::{StoreError, UserContext, UserId};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHistoryData {
    pub schema_version: u32,
    pub sessions: Vec<SessionRecord>,
}

impl Default for SessionHistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: UserId,
    pub name: String,
    /// See `store::credentials` for the format.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserEntry {
    fn context(&self) -> UserContext {
        UserContext {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRegistryData {
    pub schema_version: u32,
    pub users: Vec<UserEntry>,
}

impl Default for UserRegistryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            users: Vec::new(),
        }
    }
}

impl UserRegistryData {
    pub fn find(&self, name: &str) -> Option<&UserEntry> {
        self.users.iter().find(|u| u.name == name)
    }

    /// Next free id. Ids start at 1 and are never reused.
    pub fn next_id(&self) -> UserId {
        let max = self.users.iter().map(|u| u.id.0).max().unwrap_or(0);
        UserId(max + 1)
    }

    /// Add a new user. Names are trimmed and must be unique.
    pub fn register(&mut self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidUser("user name is empty".to_string()));
        }
        if password.is_empty() {
            return Err(StoreError::InvalidUser("password is empty".to_string()));
        }
        if self.find(name).is_some() {
            return Err(StoreError::InvalidUser(format!("user name {name} is taken")));
        }

        let entry = UserEntry {
            id: self.next_id(),
            name: name.to_string(),
            password_hash: hash_password(password),
            created_at: Utc::now(),
        };
        let user = entry.context();
        self.users.push(entry);
        Ok(user)
    }

    /// Check credentials. Unknown names and wrong passwords fail the same way.
    pub fn login(&self, name: &str, password: &str) -> Result<UserContext, StoreError> {
        self.find(name.trim())
            .filter(|entry| verify_password(password, &entry.password_hash))
            .map(UserEntry::context)
            .ok_or_else(|| StoreError::InvalidUser("wrong user name or password".to_string()))
    }
}
