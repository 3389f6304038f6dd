//! Category badge counts

use serde::Serialize;

use super::payment::DirectionTab;

/// Where a single badge count came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum CountStatus {
    #[default]
    Pending,
    Fresh,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CountEntry {
    pub value: u64,
    pub status: CountStatus,
}

/// Unfiltered totals per tab
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCounts {
    pub all: CountEntry,
    pub incoming: CountEntry,
    pub outgoing: CountEntry,
}

impl CountEntry {
    pub fn fresh(value: u64) -> Self {
        Self { value, status: CountStatus::Fresh }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self { value: 0, status: CountStatus::Failed(reason.into()) }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, CountStatus::Failed(_))
    }

    /// Badge label, e.g. `12`, `0!` when the count could not be loaded, `…` while pending
    pub fn label(&self) -> String {
        match self.status {
            CountStatus::Pending => "…".to_string(),
            CountStatus::Fresh => self.value.to_string(),
            CountStatus::Failed(_) => format!("{}!", self.value),
        }
    }
}

impl CategoryCounts {
    pub fn get(&self, tab: DirectionTab) -> &CountEntry {
        match tab {
            DirectionTab::All => &self.all,
            DirectionTab::Incoming => &self.incoming,
            DirectionTab::Outgoing => &self.outgoing,
        }
    }
}
