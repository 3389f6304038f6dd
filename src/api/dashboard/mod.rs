pub mod client;
pub mod models;

pub use client::DashboardClient;
pub use models::{ApiError, PaymentEnvelope, PaymentQuery};
