use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::dashboard::PaymentQuery;
use crate::api::PaymentSource;
use crate::models::{DirectionTab, FilterCriteria, PaymentRecord};
use crate::utils::errors::FetchError;

/// Identifies one list request. Later requests always carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Hands out request tokens and remembers the newest one
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

/// One page of normalized records and the server's total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub records: Vec<PaymentRecord>,
    pub total_items: u64,
}

/// Result of a list request, tagged with the token it was issued under
#[derive(Debug)]
pub struct FetchResponse {
    pub token: RequestToken,
    pub direction: DirectionTab,
    pub page: u32,
    pub result: Result<FetchedPage, FetchError>,
}

/// Issues list requests against the payment source
pub struct CollectionFetcher {
    source: Arc<dyn PaymentSource>,
    sequencer: RequestSequencer,
}

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl RequestSequencer {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

impl CollectionFetcher {
    pub fn new(source: Arc<dyn PaymentSource>) -> Self {
        Self {
            source,
            sequencer: RequestSequencer::default(),
        }
    }

    /// Reserve the next token. Any response under an older token becomes stale.
    pub fn issue(&self) -> RequestToken {
        self.sequencer.issue()
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.sequencer.is_latest(token)
    }

    /// Fetch one page under a token reserved with `issue`. A failed request
    /// carries no records, only the error.
    pub async fn fetch(
        &self,
        token: RequestToken,
        direction: DirectionTab,
        criteria: &FilterCriteria,
        page: u32,
        page_size: u32,
    ) -> FetchResponse {
        let query = PaymentQuery::new(direction, criteria, page, page_size);
        debug!(
            "Request #{} for {} page {} ({})",
            token.0,
            direction,
            query.page,
            criteria.describe()
        );

        let result = match self.source.list_payments(&query).await {
            Ok(envelope) => {
                let normalized = envelope.normalize(direction);
                for skipped in &normalized.skipped {
                    warn!("Request #{}: skipped payment row: {}", token.0, skipped);
                }
                Ok(FetchedPage {
                    records: normalized.records,
                    total_items: normalized.total_items,
                })
            }
            Err(e) => {
                warn!("Request #{} for {} payments failed: {}", token.0, direction, e);
                Err(FetchError::new(direction, e))
            }
        };

        FetchResponse {
            token,
            direction,
            page: query.page,
            result,
        }
    }
}
