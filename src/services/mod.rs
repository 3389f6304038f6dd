pub mod count_service;
pub mod export_service;
pub mod fetch_service;
pub mod price_service;
pub mod view_service;

#[cfg(test)]
pub mod testing;

pub use view_service::{CycleOutcome, ViewSettings, ViewSnapshot, ViewStatus, ViewSynchronizer};
