use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::models::period::{Bucket, PeriodSelection};
use crate::models::statistics::{
    DataSource, StatisticsRequest, StatisticsResponse, StatisticsView, Totals,
};
use crate::providers::traits::StatisticsProvider;
use crate::services::period_service::PeriodService;
use crate::services::synthesis;

/// Identifies one statistics request. Only the most recently issued token
/// may update the service state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Loads statistics for the current selection and keeps the latest view.
///
/// Overlapping requests are resolved by generation: every `refresh` takes a
/// new [`RequestToken`], and a response whose token is no longer the latest
/// is discarded, so a slow response for an old selection can never
/// overwrite a newer one.
///
/// Failures never reach the caller. A failed fetch falls back to the
/// last-known view for the same selection, or to synthesized data.
pub struct StatisticsService {
    provider: Option<Arc<dyn StatisticsProvider>>,
    period_service: PeriodService,
    generation: AtomicU64,
    latest: Mutex<Option<StatisticsView>>,
}

impl StatisticsService {
    pub fn new(provider: Arc<dyn StatisticsProvider>) -> Self {
        Self {
            provider: Some(provider),
            period_service: PeriodService::new(),
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// A service without backend: every view is synthesized.
    pub fn offline() -> Self {
        Self {
            provider: None,
            period_service: PeriodService::new(),
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
        }
    }

    /// Issue a new token, superseding every earlier one.
    pub fn begin_request(&self) -> RequestToken {
        RequestToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// `true` if no request was issued after `token`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// The last view accepted by [`StatisticsService::refresh`].
    pub fn latest(&self) -> Option<StatisticsView> {
        self.latest.lock().clone()
    }

    /// Load statistics for `selection`.
    ///
    /// Returns the new view, or `None` if a newer request was issued while
    /// this one was in flight (the response is then dropped).
    pub async fn refresh(
        &self,
        selection: &PeriodSelection,
        compare_previous: bool,
    ) -> Option<StatisticsView> {
        let token = self.begin_request();
        let buckets = self
            .period_service
            .buckets(selection.granularity, &selection.anchor);

        let view = if buckets.is_empty() {
            debug!(anchor = %selection.anchor, "Skipping fetch for unparseable anchor");
            self.empty_view(selection)
        } else {
            match &self.provider {
                None => self.synthesized_view(selection, &buckets, compare_previous, None),
                Some(provider) => {
                    let request = StatisticsRequest::from_selection(selection, compare_previous);
                    match provider.fetch_statistics(&request).await {
                        Ok(response) => {
                            self.build_view(selection, &buckets, compare_previous, response)
                        }
                        Err(e) => {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                granularity = %selection.granularity,
                                anchor = %selection.anchor,
                                "Statistics fetch failed, falling back"
                            );
                            self.fallback_view(selection, &buckets, compare_previous)
                        }
                    }
                }
            }
        };

        self.apply(token, view)
    }

    /// Store `view` if `token` is still the latest request.
    pub fn apply(&self, token: RequestToken, view: StatisticsView) -> Option<StatisticsView> {
        let mut latest = self.latest.lock();
        if !self.is_current(token) {
            debug!(
                token = token.0,
                current = self.generation.load(Ordering::SeqCst),
                "Discarding stale statistics response"
            );
            return None;
        }
        *latest = Some(view.clone());
        Some(view)
    }

    /// Turn a backend response into a view.
    ///
    /// Backend points are passed through as-is; an empty `dataPoints`
    /// falls back to synthesized points (keeping the backend totals).
    /// Backend previous-period data is not supported yet and yields an
    /// empty comparison series.
    pub fn build_view(
        &self,
        selection: &PeriodSelection,
        buckets: &[Bucket],
        compare_previous: bool,
        response: StatisticsResponse,
    ) -> StatisticsView {
        if response.data_points.is_empty() {
            return self.synthesized_view(selection, buckets, compare_previous, Some(response.totals));
        }

        if compare_previous && response.previous_period.is_some() {
            info!("Backend previous-period data is not supported yet, ignoring it");
        }

        StatisticsView {
            selection: selection.clone(),
            data_points: synthesis::map_api_points(&response.data_points),
            previous_points: Vec::new(),
            totals: response.totals,
            source: DataSource::Backend,
        }
    }

    /// Placeholder view built from deterministic synthetic revenue.
    ///
    /// Without backend totals, `totals.revenue` is the sum of the points and
    /// every other total is zero.
    pub fn synthesized_view(
        &self,
        selection: &PeriodSelection,
        buckets: &[Bucket],
        compare_previous: bool,
        totals: Option<Totals>,
    ) -> StatisticsView {
        let granularity = selection.granularity;
        let data_points = synthesis::synthesize(granularity, buckets);

        let previous_points = if compare_previous {
            self.period_service
                .previous_period_value(granularity, &selection.anchor)
                .map(|prev| {
                    let prev_buckets = self.period_service.buckets(granularity, &prev);
                    synthesis::synthesize_previous(granularity, &prev_buckets)
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let totals = totals.unwrap_or_else(|| Totals {
            revenue: data_points.iter().map(|p| p.revenue).sum(),
            ..Totals::default()
        });

        StatisticsView {
            selection: selection.clone(),
            data_points,
            previous_points,
            totals,
            source: DataSource::Synthesized,
        }
    }

    fn fallback_view(
        &self,
        selection: &PeriodSelection,
        buckets: &[Bucket],
        compare_previous: bool,
    ) -> StatisticsView {
        match self.latest() {
            Some(view) if &view.selection == selection => view,
            _ => self.synthesized_view(selection, buckets, compare_previous, None),
        }
    }

    fn empty_view(&self, selection: &PeriodSelection) -> StatisticsView {
        StatisticsView {
            selection: selection.clone(),
            data_points: Vec::new(),
            previous_points: Vec::new(),
            totals: Totals::default(),
            source: DataSource::Synthesized,
        }
    }
}
