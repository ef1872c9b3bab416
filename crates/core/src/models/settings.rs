use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::chart::ChartGeometry;

/// Upper bound for [`Settings::anchor_history`] (twenty years of months).
pub const MAX_ANCHOR_HISTORY: usize = 240;

/// Runtime configuration of the dashboard core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the merchant backend API (no trailing slash needed).
    pub api_base_url: String,

    /// Bearer token sent with every backend request, if any.
    pub api_token: Option<String>,

    /// Display currency code (e.g. "XAF").
    pub currency: String,

    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,

    /// Logical canvas of the revenue chart.
    pub chart: ChartGeometry,

    /// How many anchors the period select box offers per granularity.
    pub anchor_history: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            currency: "XAF".to_string(),
            request_timeout_secs: 30,
            chart: ChartGeometry::default(),
            anchor_history: 12,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, falling back to defaults.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `MERCHANT_API_URL` | `api_base_url` |
    /// | `MERCHANT_API_TOKEN` | `api_token` |
    /// | `MERCHANT_CURRENCY` | `currency` |
    /// | `MERCHANT_TIMEOUT_SECS` | `request_timeout_secs` |
    /// | `MERCHANT_ANCHOR_HISTORY` | `anchor_history` |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(url) = lookup("MERCHANT_API_URL") {
            settings.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(token) = lookup("MERCHANT_API_TOKEN") {
            let token = token.trim().to_string();
            settings.api_token = (!token.is_empty()).then_some(token);
        }
        if let Some(currency) = lookup("MERCHANT_CURRENCY") {
            settings.currency = currency.trim().to_uppercase();
        }
        if let Some(raw) = lookup("MERCHANT_TIMEOUT_SECS") {
            settings.request_timeout_secs = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!("MERCHANT_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?;
        }
        if let Some(raw) = lookup("MERCHANT_ANCHOR_HISTORY") {
            settings.anchor_history = raw.trim().parse().map_err(|_| {
                CoreError::Config(format!(
                    "MERCHANT_ANCHOR_HISTORY must be a number, got '{raw}'"
                ))
            })?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants that the rest of the library relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(CoreError::Config(format!(
                "API URL '{}' must start with http:// or https://",
                self.api_base_url
            )));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Config(format!(
                "Invalid currency code '{}': must be exactly 3 ASCII letters (e.g., XAF, EUR, USD)",
                self.currency
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.anchor_history == 0 {
            return Err(CoreError::Config(
                "Anchor history must offer at least one period".to_string(),
            ));
        }
        if self.anchor_history > MAX_ANCHOR_HISTORY {
            return Err(CoreError::Config(format!(
                "Anchor history must not exceed {MAX_ANCHOR_HISTORY} periods, got {}",
                self.anchor_history
            )));
        }
        Ok(())
    }
}
