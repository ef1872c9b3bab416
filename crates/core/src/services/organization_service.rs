use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::organization::{NewOrganization, Organization, OrganizationUpdate};
use crate::providers::traits::OrganizationProvider;

#[derive(Default)]
struct OrganizationState {
    organizations: Vec<Organization>,
    selected: Option<String>,
}

/// Pass-through CRUD for the merchant's organizations.
///
/// The backend is the source of truth; the service keeps a local mirror of
/// the last known list (updated after every successful call) and which
/// organization is selected in the dashboard.
pub struct OrganizationService {
    provider: Arc<dyn OrganizationProvider>,
    state: RwLock<OrganizationState>,
}

impl OrganizationService {
    pub fn new(provider: Arc<dyn OrganizationProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(OrganizationState::default()),
        }
    }

    /// Reload the list from the backend.
    ///
    /// Keeps the selection if it still exists, otherwise selects the first
    /// organization (or none).
    pub async fn refresh(&self) -> Result<Vec<Organization>, CoreError> {
        let organizations = self.provider.list().await?;
        let mut state = self.state.write();
        let still_there = state
            .selected
            .as_ref()
            .is_some_and(|id| organizations.iter().any(|o| &o.id == id));
        if !still_there {
            state.selected = organizations.first().map(|o| o.id.clone());
        }
        state.organizations = organizations.clone();
        debug!(count = organizations.len(), "Organizations refreshed");
        Ok(organizations)
    }

    /// Last known list, without a network call.
    pub fn organizations(&self) -> Vec<Organization> {
        self.state.read().organizations.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Organization, CoreError> {
        let organization = self.provider.get(id).await?;
        self.upsert(organization.clone());
        Ok(organization)
    }

    pub async fn create(&self, organization: NewOrganization) -> Result<Organization, CoreError> {
        let name = organization.name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationError(
                "Organization name must not be empty".into(),
            ));
        }
        let organization = NewOrganization {
            name: name.to_string(),
            ..organization
        };

        let created = self.provider.create(&organization).await?;
        info!(organization_id = %created.id, "Organization created");
        self.upsert(created.clone());

        let mut state = self.state.write();
        if state.selected.is_none() {
            state.selected = Some(created.id.clone());
        }
        Ok(created)
    }

    pub async fn update(
        &self,
        id: &str,
        update: OrganizationUpdate,
    ) -> Result<Organization, CoreError> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(CoreError::ValidationError(
                    "Organization name must not be empty".into(),
                ));
            }
        }
        let updated = self.provider.update(id, &update).await?;
        info!(organization_id = %updated.id, "Organization updated");
        self.upsert(updated.clone());
        Ok(updated)
    }

    /// Delete on the backend, then drop it locally (and from the selection).
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.provider.delete(id).await?;
        let mut state = self.state.write();
        state.organizations.retain(|o| o.id != id);
        if state.selected.as_deref() == Some(id) {
            state.selected = state.organizations.first().map(|o| o.id.clone());
        }
        info!(organization_id = id, "Organization deleted");
        Ok(())
    }

    /// Select a known organization.
    pub fn select(&self, id: &str) -> Result<(), CoreError> {
        let mut state = self.state.write();
        if !state.organizations.iter().any(|o| o.id == id) {
            return Err(CoreError::OrganizationNotFound(id.to_string()));
        }
        state.selected = Some(id.to_string());
        Ok(())
    }

    pub fn selected(&self) -> Option<Organization> {
        let state = self.state.read();
        let id = state.selected.as_ref()?;
        state.organizations.iter().find(|o| &o.id == id).cloned()
    }

    fn upsert(&self, organization: Organization) {
        let mut state = self.state.write();
        match state
            .organizations
            .iter_mut()
            .find(|o| o.id == organization.id)
        {
            Some(existing) => *existing = organization,
            None => state.organizations.push(organization),
        }
    }
}
