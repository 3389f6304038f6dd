//! Domain models for the payments dashboard
//!
//! Everything here is produced after the wire payload has been normalized;
//! raw backend shapes live in `api::dashboard::models`.

pub mod counts;
pub mod filter;
pub mod payment;

pub use counts::{CategoryCounts, CountEntry};
pub use filter::{AmountFilter, FilterCriteria, FilterModel, NumericOperator};
pub use payment::{DirectionTab, PaymentDirection, PaymentRecord, PaymentState};
