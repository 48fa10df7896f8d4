//! In-memory account store.
//!
//! Usernames are unique case-insensitively; the key is the lowercased name.

use crate::errors::GatekeeperError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

fn key(username: &str) -> String {
    username.trim().to_lowercase()
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_by_username(&self, username: &str) -> Option<UserRecord> {
        self.users.read().await.get(&key(username)).cloned()
    }

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `GatekeeperError::Conflict` if the username is taken.
    pub async fn insert(&self, record: UserRecord) -> Result<UserRecord, GatekeeperError> {
        let mut users = self.users.write().await;
        let key = key(&record.username);
        if users.contains_key(&key) {
            return Err(GatekeeperError::Conflict(
                "An account with this username already exists".to_string(),
            ));
        }
        users.insert(key, record.clone());
        Ok(record)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}
