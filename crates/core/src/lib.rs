pub mod errors;
pub mod logging;
pub mod models;
pub mod providers;
pub mod services;

use chrono::NaiveDate;
use models::{
    chart::{ChartModel, HoverState},
    period::{Granularity, PeriodSelection},
    settings::Settings,
    statistics::{DataSource, StatisticsView},
};
use providers::{
    http::{ApiClient, HttpOrganizationProvider, HttpStatisticsProvider},
    memory::InMemoryUserRepository,
    traits::{OrganizationProvider, StatisticsProvider, UserRepository},
};
use services::{
    auth_service::AuthService, chart_service::ChartService,
    currency_service::CurrencyFormatter, organization_service::OrganizationService,
    period_service::PeriodService, statistics_service::StatisticsService,
};
use std::sync::Arc;
use tracing::debug;

use errors::CoreError;

/// Main entry point for the merchant dashboard core library.
/// Holds the statistics page state and all services the dashboard uses.
#[must_use]
pub struct MerchantDashboard {
    settings: Settings,
    period_service: PeriodService,
    chart_service: ChartService,
    statistics_service: StatisticsService,
    auth_service: AuthService,
    organization_service: Option<OrganizationService>,
    formatter: CurrencyFormatter,
    selection: PeriodSelection,
    compare_previous: bool,
    hover: HoverState,
}

impl std::fmt::Debug for MerchantDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MerchantDashboard")
            .field("api_base_url", &self.settings.api_base_url)
            .field("selection", &self.selection)
            .field("compare_previous", &self.compare_previous)
            .field("hovered_index", &self.hover.hovered_index())
            .field("authenticated", &self.auth_service.is_authenticated())
            .finish()
    }
}

impl MerchantDashboard {
    /// Dashboard backed by the HTTP API at `settings.api_base_url`, with an
    /// in-memory account store.
    pub fn connect(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let api = ApiClient::new(&settings)?;
        Ok(Self::with_providers(
            settings,
            Some(Arc::new(HttpStatisticsProvider::new(api.clone()))),
            Some(Arc::new(HttpOrganizationProvider::new(api))),
            Arc::new(InMemoryUserRepository::new()),
        ))
    }

    /// Dashboard without backend: statistics are synthesized and
    /// organization management is unavailable.
    pub fn offline(settings: Settings) -> Self {
        Self::with_providers(settings, None, None, Arc::new(InMemoryUserRepository::new()))
    }

    /// Dashboard over explicit providers (custom backends, tests).
    pub fn with_providers(
        settings: Settings,
        statistics: Option<Arc<dyn StatisticsProvider>>,
        organizations: Option<Arc<dyn OrganizationProvider>>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        let today = chrono::Utc::now().date_naive();
        Self::build(settings, statistics, organizations, users, today)
    }

    /// Same as [`MerchantDashboard::with_providers`] with a fixed "today",
    /// which decides the default anchor.
    pub fn with_providers_on(
        settings: Settings,
        statistics: Option<Arc<dyn StatisticsProvider>>,
        organizations: Option<Arc<dyn OrganizationProvider>>,
        users: Arc<dyn UserRepository>,
        today: NaiveDate,
    ) -> Self {
        Self::build(settings, statistics, organizations, users, today)
    }

    // ── Period Selection ────────────────────────────────────────────

    #[must_use]
    pub fn selection(&self) -> &PeriodSelection {
        &self.selection
    }

    /// Switch granularity. The anchor resets to the latest period
    /// (the one containing today) and the hover state is cleared.
    pub fn select_granularity(&mut self, granularity: Granularity) {
        let today = chrono::Utc::now().date_naive();
        self.select_granularity_on(granularity, today);
    }

    /// [`MerchantDashboard::select_granularity`] with an explicit "today".
    pub fn select_granularity_on(&mut self, granularity: Granularity, today: NaiveDate) {
        if granularity == self.selection.granularity {
            return;
        }
        let anchor = self.period_service.default_anchor(granularity, today);
        debug!(%granularity, %anchor, "Granularity changed");
        self.selection = PeriodSelection::new(granularity, anchor);
        self.hover.clear();
    }

    /// Select an anchor for the current granularity.
    /// The value is normalized (`"nov 2025"` → `"November 2025"`).
    pub fn select_anchor(&mut self, anchor: &str) -> Result<(), CoreError> {
        let granularity = self.selection.granularity;
        let normalized = self
            .period_service
            .normalize_anchor(granularity, anchor)
            .ok_or_else(|| {
                CoreError::ValidationError(format!(
                    "'{anchor}' is not a valid {granularity} period"
                ))
            })?;
        self.selection.anchor = normalized;
        self.hover.clear();
        Ok(())
    }

    /// Anchors offered in the period select box, latest first.
    #[must_use]
    pub fn anchor_options(&self) -> Vec<String> {
        let today = chrono::Utc::now().date_naive();
        self.anchor_options_on(today)
    }

    /// [`MerchantDashboard::anchor_options`] with an explicit "today".
    #[must_use]
    pub fn anchor_options_on(&self, today: NaiveDate) -> Vec<String> {
        self.period_service.anchor_options(
            self.selection.granularity,
            today,
            self.settings.anchor_history,
        )
    }

    /// Label of the period preceding the current selection.
    #[must_use]
    pub fn previous_period_value(&self) -> Option<String> {
        self.period_service
            .previous_period_value(self.selection.granularity, &self.selection.anchor)
    }

    #[must_use]
    pub fn compare_previous(&self) -> bool {
        self.compare_previous
    }

    /// Toggle the previous-period comparison overlay.
    pub fn set_compare_previous(&mut self, enabled: bool) {
        self.compare_previous = enabled;
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Fetch statistics for the current selection.
    ///
    /// Returns `None` when a newer refresh superseded this one.
    pub async fn refresh_statistics(&self) -> Option<StatisticsView> {
        self.statistics_service
            .refresh(&self.selection, self.compare_previous)
            .await
    }

    /// Statistics for the current selection: the last fetched backend view
    /// if it matches, otherwise deterministic synthesized data.
    #[must_use]
    pub fn statistics(&self) -> StatisticsView {
        let buckets = self
            .period_service
            .buckets(self.selection.granularity, &self.selection.anchor);
        match self.statistics_service.latest() {
            Some(view) if view.selection == self.selection => match view.source {
                DataSource::Backend => view,
                // Recomputed so the comparison toggle applies immediately
                DataSource::Synthesized => self.statistics_service.synthesized_view(
                    &self.selection,
                    &buckets,
                    self.compare_previous,
                    Some(view.totals),
                ),
            },
            _ => self.statistics_service.synthesized_view(
                &self.selection,
                &buckets,
                self.compare_previous,
                None,
            ),
        }
    }

    // ── Chart ───────────────────────────────────────────────────────

    /// Fully computed chart for the current selection and hover state.
    #[must_use]
    pub fn chart(&self) -> ChartModel {
        let view = self.statistics();
        self.chart_service.build(
            &view.data_points,
            &view.previous_points,
            self.compare_previous,
            &self.hover,
        )
    }

    /// Standalone SVG for the current chart.
    #[must_use]
    pub fn render_chart_svg(&self) -> String {
        self.chart_service.render_svg(&self.chart(), &self.formatter)
    }

    /// Pointer entered the hit region of point `index`.
    pub fn hover(&mut self, index: usize) {
        let count = self.statistics().data_points.len();
        self.hover.enter(index, count);
    }

    /// Pointer left the chart container.
    pub fn clear_hover(&mut self) {
        self.hover.clear();
    }

    #[must_use]
    pub fn hovered_index(&self) -> Option<usize> {
        self.hover.hovered_index()
    }

    // ── Auth & Organizations ────────────────────────────────────────

    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }

    /// Organization management, or `None` for an offline dashboard.
    pub fn organizations(&self) -> Option<&OrganizationService> {
        self.organization_service.as_ref()
    }

    // ── Settings & Formatting ───────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Amount in the display currency, e.g. `1 250 000 XAF`.
    #[must_use]
    pub fn format_amount(&self, amount: f64) -> String {
        self.formatter.format(amount)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(
        settings: Settings,
        statistics: Option<Arc<dyn StatisticsProvider>>,
        organizations: Option<Arc<dyn OrganizationProvider>>,
        users: Arc<dyn UserRepository>,
        today: NaiveDate,
    ) -> Self {
        let period_service = PeriodService::new();
        let granularity = Granularity::Days;
        let selection =
            PeriodSelection::new(granularity, period_service.default_anchor(granularity, today));
        let statistics_service = match statistics {
            Some(provider) => StatisticsService::new(provider),
            None => StatisticsService::offline(),
        };

        Self {
            chart_service: ChartService::new(settings.chart),
            formatter: CurrencyFormatter::new(&settings.currency),
            statistics_service,
            auth_service: AuthService::new(users),
            organization_service: organizations.map(OrganizationService::new),
            period_service,
            selection,
            compare_previous: false,
            hover: HoverState::new(),
            settings,
        }
    }
}
