use tracing::debug;

use super::{view, Dashboard};

pub async fn execute(dashboard: &Dashboard, id: &str) -> Result<String, String> {
    debug!("Looking up payment {}", id);
    let row = dashboard
        .client
        .get_payment(id)
        .await
        .map_err(|e| format!("❌ Could not load payment: {}", e))?;

    let record = row
        .normalize(None)
        .map_err(|e| format!("❌ Payment {} could not be read: {}", id, e))?;

    Ok(view::render_detail(&record, dashboard.btc_price().await))
}
