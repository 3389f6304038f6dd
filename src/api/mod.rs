pub mod dashboard;

use async_trait::async_trait;

use dashboard::{ApiError, PaymentEnvelope, PaymentQuery};

/// Remote collection of payments. Implemented by the HTTP client and by in-memory fakes in tests.
#[async_trait]
pub trait PaymentSource: Send + Sync {
    async fn list_payments(&self, query: &PaymentQuery) -> Result<PaymentEnvelope, ApiError>;
}
