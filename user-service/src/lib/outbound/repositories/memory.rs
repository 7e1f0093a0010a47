use std::collections::HashMap;

use async_trait::async_trait;
use auth::StoreError;
use auth::StoredIdentity;
use auth::UserStore;
use tokio::sync::RwLock;

/// User store kept in process memory.
///
/// Contents are lost on restart, which matches the lifetime of a generated
/// signing key.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, StoredIdentity>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn save(&self, identity: StoredIdentity) -> Result<StoredIdentity, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&identity.username) {
            return Err(StoreError::UsernameTaken(identity.username));
        }

        users.insert(identity.username.clone(), identity.clone());
        Ok(identity)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredIdentity>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }
}
