use std::path::PathBuf;

use super::Dashboard;
use crate::services::export_service;

const DEFAULT_EXPORT_FILE: &str = "payments.csv";

pub async fn execute(dashboard: &Dashboard, path: Option<PathBuf>) -> Result<String, String> {
    let snapshot = dashboard.view.snapshot().await;
    if snapshot.records.is_empty() {
        return Err("❌ Nothing to export on this page".to_string());
    }

    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
    let count = export_service::export_to_file(&snapshot.records, &path).await?;
    Ok(format!("✅ Exported {} payment(s) to {}", count, path.display()))
}
