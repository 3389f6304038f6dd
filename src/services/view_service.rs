//! Payment list view state
//!
//! `ViewSynchronizer` owns the active filter, tab and page, drives the
//! fetcher and the count aggregator, and hands the renderer a consistent
//! `ViewSnapshot`. Each trigger runs one fetch cycle:
//!
//! ```text
//! Idle --mount--> Loading --ok--> Ready
//!                         --err-> Error
//! Ready|Error --filter|tab|page--> Loading
//! ```
//!
//! Cycles may overlap. Only the cycle holding the newest request token may
//! write its result; older ones finish as `CycleOutcome::Superseded`. The
//! badge counts follow the same rule with their own token sequence.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::count_service::CountAggregator;
use super::fetch_service::{CollectionFetcher, RequestSequencer};
use crate::api::PaymentSource;
use crate::models::{CategoryCounts, DirectionTab, FilterCriteria, FilterModel, PaymentRecord};
use crate::utils::errors::{FetchError, InvalidFilterError};
use crate::utils::page::{clamp_page, PaginationState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// How a fetch cycle ended
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Ready,
    Failed(FetchError),
    /// A newer request was issued before this one resolved; its result was dropped
    Superseded,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewSettings {
    pub page_size: u32,
    pub max_visible_pages: u32,
}

/// Tab, filter and page a list request is made for
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewTarget {
    pub direction: DirectionTab,
    pub criteria: FilterCriteria,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_numbers: Vec<u32>,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Read-only view handed to the renderer.
///
/// `direction`, `criteria` and `pagination` always describe `records`. When the
/// requested view has not loaded yet (still in flight, or failed) it is
/// reported separately in `pending`.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub records: Vec<PaymentRecord>,
    pub pagination: PaginationView,
    pub counts: CategoryCounts,
    pub status: ViewStatus,
    pub error: Option<FetchError>,
    pub direction: DirectionTab,
    pub criteria: FilterCriteria,
    pub pending: Option<ViewTarget>,
}

/// Last successfully fetched page, replaced as a whole
#[derive(Debug, Clone)]
struct VisibleSet {
    target: ViewTarget,
    records: Vec<PaymentRecord>,
    pagination: PaginationState,
}

#[derive(Debug)]
struct ViewState {
    filter: FilterModel,
    direction: DirectionTab,
    page: u32,
    status: ViewStatus,
    visible: Option<VisibleSet>,
    error: Option<FetchError>,
    counts: CategoryCounts,
}

pub struct ViewSynchronizer {
    fetcher: CollectionFetcher,
    aggregator: CountAggregator,
    count_sequencer: RequestSequencer,
    settings: ViewSettings,
    state: Mutex<ViewState>,
}

impl ViewSettings {
    pub fn new(page_size: u32, max_visible_pages: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            max_visible_pages: max_visible_pages.max(1),
        }
    }
}

impl CycleOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, CycleOutcome::Superseded)
    }
}

impl PaginationView {
    fn from_state(state: &PaginationState, max_visible: u32) -> Self {
        Self {
            page: state.page,
            total_pages: state.total_pages,
            total_items: state.total_items,
            page_numbers: state.page_numbers(max_visible),
            has_next: state.has_next(),
            has_prev: state.has_prev(),
        }
    }
}

impl ViewState {
    fn requested(&self) -> ViewTarget {
        ViewTarget {
            direction: self.direction,
            criteria: self.filter.active().clone(),
            page: self.page,
        }
    }

    /// Pagination of the page on screen, if it belongs to the current tab and filter
    fn displayed_pagination(&self) -> Option<&PaginationState> {
        self.visible
            .as_ref()
            .filter(|v| {
                v.target.direction == self.direction && &v.target.criteria == self.filter.active()
            })
            .map(|v| &v.pagination)
    }
}

impl ViewSynchronizer {
    pub fn new(source: Arc<dyn PaymentSource>, settings: ViewSettings) -> Self {
        Self {
            fetcher: CollectionFetcher::new(source.clone()),
            aggregator: CountAggregator::new(source),
            count_sequencer: RequestSequencer::default(),
            settings,
            state: Mutex::new(ViewState {
                filter: FilterModel::default(),
                direction: DirectionTab::All,
                page: 1,
                status: ViewStatus::Idle,
                visible: None,
                error: None,
                counts: CategoryCounts::default(),
            }),
        }
    }

    /// Initial load: first page and the three badge counts, concurrently
    pub async fn mount(&self) -> CycleOutcome {
        info!("Mounting payments view");
        let counts_token = {
            let mut state = self.state.lock().await;
            state.counts = CategoryCounts::default();
            self.count_sequencer.issue()
        };

        let (outcome, counts) = tokio::join!(self.run_cycle(), self.aggregator.refresh_counts());

        let mut state = self.state.lock().await;
        if self.count_sequencer.is_latest(counts_token) {
            state.counts = counts;
        } else {
            debug!("Discarding stale counts #{}", counts_token.value());
        }
        outcome
    }

    /// Reload the current page and the badge counts
    pub async fn refresh(&self) -> CycleOutcome {
        self.mount().await
    }

    /// Replace the filter and go back to page 1. Invalid criteria are rejected
    /// without touching state or the network.
    pub async fn apply_filter(
        &self,
        criteria: FilterCriteria,
    ) -> Result<CycleOutcome, InvalidFilterError> {
        {
            let mut state = self.state.lock().await;
            if let Err(e) = state.filter.apply(criteria) {
                warn!("Rejected filter: {}", e);
                return Err(e);
            }
            state.page = 1;
            info!("Filter applied: {}", state.filter.active().describe());
        }
        Ok(self.run_cycle().await)
    }

    pub async fn clear_filter(&self) -> CycleOutcome {
        {
            let mut state = self.state.lock().await;
            state.filter = FilterModel::default();
            state.page = 1;
            info!("Filter cleared");
        }
        self.run_cycle().await
    }

    /// Switch tab and go back to page 1
    pub async fn set_direction(&self, direction: DirectionTab) -> CycleOutcome {
        {
            let mut state = self.state.lock().await;
            state.direction = direction;
            state.page = 1;
            info!("Switched to {} payments", direction);
        }
        self.run_cycle().await
    }

    /// Move to page `n`, clamped to the page count of the current tab and filter.
    /// Until that tab has loaded only page 1 is known. The filter is kept.
    pub async fn go_to_page(&self, n: u32) -> CycleOutcome {
        {
            let mut state = self.state.lock().await;
            let total_pages = state.displayed_pagination().map(|p| p.total_pages).unwrap_or(1);
            state.page = clamp_page(n, total_pages);
            if state.page != n {
                debug!("Requested page {} clamped to {}", n, state.page);
            }
        }
        self.run_cycle().await
    }

    /// Step forward from the page on screen
    pub async fn next_page(&self) -> CycleOutcome {
        let target = {
            let state = self.state.lock().await;
            match state.displayed_pagination() {
                Some(pagination) => pagination.next_page().unwrap_or(pagination.page),
                None => state.page.saturating_add(1),
            }
        };
        self.go_to_page(target).await
    }

    /// Step back from the page on screen
    pub async fn previous_page(&self) -> CycleOutcome {
        let target = {
            let state = self.state.lock().await;
            match state.displayed_pagination() {
                Some(pagination) => pagination.prev_page().unwrap_or(pagination.page),
                None => state.page.saturating_sub(1),
            }
        };
        self.go_to_page(target).await
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.lock().await;
        let requested = state.requested();
        let (records, pagination, shown, pending) = match &state.visible {
            Some(visible) => {
                let pending = (visible.target != requested).then(|| requested.clone());
                (
                    visible.records.clone(),
                    visible.pagination.clone(),
                    visible.target.clone(),
                    pending,
                )
            }
            None => (Vec::new(), PaginationState::empty(self.settings.page_size), requested, None),
        };

        ViewSnapshot {
            records,
            pagination: PaginationView::from_state(&pagination, self.settings.max_visible_pages),
            counts: state.counts.clone(),
            status: state.status,
            error: state.error.clone(),
            direction: shown.direction,
            criteria: shown.criteria,
            pending,
        }
    }

    /// One fetch cycle for whatever tab, filter and page are current when it starts
    async fn run_cycle(&self) -> CycleOutcome {
        let page_size = self.settings.page_size;
        let mut reanchored = false;

        loop {
            let (token, target) = {
                let mut state = self.state.lock().await;
                let token = self.fetcher.issue();
                state.status = ViewStatus::Loading;
                (token, state.requested())
            };

            let response = self
                .fetcher
                .fetch(token, target.direction, &target.criteria, target.page, page_size)
                .await;

            let mut state = self.state.lock().await;
            if !self.fetcher.is_latest(response.token) {
                debug!("Discarding stale response #{}", response.token.value());
                return CycleOutcome::Superseded;
            }

            match response.result {
                Ok(fetched) => {
                    let requested_page = response.page;
                    let pagination =
                        PaginationState::new(requested_page, page_size, fetched.total_items);
                    if pagination.page != requested_page && !reanchored {
                        // The collection shrank below the requested page
                        debug!(
                            "Page {} out of range, re-fetching page {}",
                            requested_page, pagination.page
                        );
                        state.page = pagination.page;
                        reanchored = true;
                        continue;
                    }

                    info!(
                        "Loaded {} {} payments (page {}/{}, {} total)",
                        fetched.records.len(),
                        response.direction,
                        pagination.page,
                        pagination.total_pages,
                        pagination.total_items
                    );
                    state.page = pagination.page;
                    state.visible = Some(VisibleSet {
                        target: ViewTarget { page: pagination.page, ..target },
                        records: fetched.records,
                        pagination,
                    });
                    state.status = ViewStatus::Ready;
                    state.error = None;
                    return CycleOutcome::Ready;
                }
                Err(e) => {
                    // Any earlier page stays on display behind the error
                    state.status = ViewStatus::Error;
                    state.error = Some(e.clone());
                    return CycleOutcome::Failed(e);
                }
            }
        }
    }
}
