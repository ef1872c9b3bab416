use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::organization::{NewOrganization, Organization, OrganizationUpdate};
use crate::models::settings::Settings;
use crate::models::statistics::{StatisticsRequest, StatisticsResponse};

use super::traits::{OrganizationProvider, StatisticsProvider};

const PROVIDER_NAME: &str = "MerchantAPI";

/// Thin reqwest wrapper for the merchant backend.
///
/// - **Auth**: optional bearer token from `Settings::api_token`
/// - **Errors**: non-2xx responses become `CoreError::Api` with the status
///   and, when present, the backend's `message` field
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Fails with `CoreError::Config` when the HTTP client cannot be built
    /// (e.g. no TLS backend available).
    pub fn new(settings: &Settings) -> Result<Self, CoreError> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: settings.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send `request` and return the raw response if the status is 2xx.
    ///
    /// A 404 on an item route (`item_id` set) becomes
    /// `CoreError::OrganizationNotFound`.
    async fn send(
        &self,
        request: RequestBuilder,
        what: &str,
        item_id: Option<&str>,
    ) -> Result<reqwest::Response, CoreError> {
        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if let (StatusCode::NOT_FOUND, Some(id)) = (status, item_id) {
            return Err(CoreError::OrganizationNotFound(id.to_string()));
        }

        let body = resp.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
        debug!(%status, what, "Backend returned an error status");

        Err(CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: match detail {
                Some(detail) => format!("{what} failed with HTTP {status}: {detail}"),
                None => format!("{what} failed with HTTP {status}"),
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
        item_id: Option<&str>,
    ) -> Result<T, CoreError> {
        self.send(request, what, item_id)
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message: format!("Failed to parse response for {what}: {e}"),
            })
    }
}

/// Statistics from `GET {base}/statistics?period=&value=&comparePrevious=`.
pub struct HttpStatisticsProvider {
    api: ApiClient,
}

impl HttpStatisticsProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl StatisticsProvider for HttpStatisticsProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn fetch_statistics(
        &self,
        request: &StatisticsRequest,
    ) -> Result<StatisticsResponse, CoreError> {
        let req = self.api.client.get(self.api.url("statistics")).query(request);
        self.api.send_json(req, "statistics", None).await
    }
}

/// Organization CRUD under `{base}/organizations`.
pub struct HttpOrganizationProvider {
    api: ApiClient,
}

impl HttpOrganizationProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn item_url(&self, id: &str) -> String {
        self.api.url(&format!("organizations/{id}"))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl OrganizationProvider for HttpOrganizationProvider {
    async fn list(&self) -> Result<Vec<Organization>, CoreError> {
        let req = self.api.client.get(self.api.url("organizations"));
        self.api.send_json(req, "list organizations", None).await
    }

    async fn get(&self, id: &str) -> Result<Organization, CoreError> {
        let req = self.api.client.get(self.item_url(id));
        self.api.send_json(req, "get organization", Some(id)).await
    }

    async fn create(&self, organization: &NewOrganization) -> Result<Organization, CoreError> {
        let req = self
            .api
            .client
            .post(self.api.url("organizations"))
            .json(organization);
        self.api.send_json(req, "create organization", None).await
    }

    async fn update(
        &self,
        id: &str,
        update: &OrganizationUpdate,
    ) -> Result<Organization, CoreError> {
        let req = self.api.client.patch(self.item_url(id)).json(update);
        self.api
            .send_json(req, "update organization", Some(id))
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let req = self.api.client.delete(self.item_url(id));
        self.api
            .send(req, "delete organization", Some(id))
            .await
            .map(|_| ())
    }
}
