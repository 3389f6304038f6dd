use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::dashboard::PaymentQuery;
use crate::api::PaymentSource;
use crate::models::{CategoryCounts, CountEntry, DirectionTab, FilterCriteria};

/// Loads the unfiltered badge count for each tab
pub struct CountAggregator {
    source: Arc<dyn PaymentSource>,
}

impl CountAggregator {
    pub fn new(source: Arc<dyn PaymentSource>) -> Self {
        Self { source }
    }

    /// Query all three tabs concurrently. A failing tab reads as 0 and is marked failed
    /// without affecting the other two.
    pub async fn refresh_counts(&self) -> CategoryCounts {
        let (all, incoming, outgoing) = tokio::join!(
            self.count(DirectionTab::All),
            self.count(DirectionTab::Incoming),
            self.count(DirectionTab::Outgoing),
        );
        CategoryCounts { all, incoming, outgoing }
    }

    async fn count(&self, tab: DirectionTab) -> CountEntry {
        // Only the total is read, the single row is thrown away
        let query = PaymentQuery::new(tab, &FilterCriteria::default(), 1, 1);
        match self.source.list_payments(&query).await {
            Ok(envelope) => {
                let total = envelope.total_items();
                debug!("{} payments total: {}", tab, total);
                CountEntry::fresh(total)
            }
            Err(e) => {
                warn!("Failed to load {} payment count: {}", tab, e);
                CountEntry::failed(e.to_string())
            }
        }
    }
}
