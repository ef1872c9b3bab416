use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::organization::{NewOrganization, Organization, OrganizationUpdate};
use crate::models::statistics::{StatisticsRequest, StatisticsResponse};
use crate::models::user::UserRecord;

/// Source of revenue statistics (normally the merchant backend).
///
/// Services depend on this trait only, so tests and offline builds can plug
/// in their own implementation.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait StatisticsProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch statistics for one period selection.
    async fn fetch_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<StatisticsResponse, CoreError>;
}

/// CRUD access to the merchant's organizations.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait OrganizationProvider: Send + Sync {
    async fn list(&self) -> Result<Vec<Organization>, CoreError>;

    /// `CoreError::OrganizationNotFound` when `id` does not exist.
    async fn get(&self, id: &str) -> Result<Organization, CoreError>;

    async fn create(&self, organization: &NewOrganization) -> Result<Organization, CoreError>;

    /// `CoreError::OrganizationNotFound` when `id` does not exist.
    async fn update(
        &self,
        id: &str,
        update: &OrganizationUpdate,
    ) -> Result<Organization, CoreError>;

    /// `CoreError::OrganizationNotFound` when `id` does not exist.
    async fn delete(&self, id: &str) -> Result<(), CoreError>;
}

/// Storage of dashboard accounts.
///
/// Emails passed in are already normalized (trimmed, lowercase).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, CoreError>;

    /// `CoreError::DuplicateEmail` when the email is already registered.
    async fn insert(&self, record: UserRecord) -> Result<(), CoreError>;

    /// All accounts, oldest first.
    async fn list(&self) -> Result<Vec<UserRecord>, CoreError>;
}
