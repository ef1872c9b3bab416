use async_trait::async_trait;
use parking_lot::RwLock;

use crate::errors::CoreError;
use crate::models::user::UserRecord;

use super::traits::UserRepository;

/// Process-local account store for demos and tests.
///
/// Owned by whoever builds it and injected into `AuthService`; there is no
/// global user list.
#[derive(Default)]
pub struct InMemoryUserRepository {
    records: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.user.email == email)
            .cloned())
    }

    async fn insert(&self, record: UserRecord) -> Result<(), CoreError> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.user.email == record.user.email) {
            return Err(CoreError::DuplicateEmail(record.user.email));
        }
        records.push(record);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserRecord>, CoreError> {
        Ok(self.records.read().clone())
    }
}
