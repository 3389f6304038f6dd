use std::path::Path;

use chrono::SecondsFormat;
use tracing::info;

use crate::models::PaymentRecord;

const CSV_HEADER: &str = "id,direction,state,amount_sat,fee_sat,created_at,description";

/// Render payment records as CSV, header first
pub fn export_csv(records: &[PaymentRecord]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for record in records {
        let fields = [
            escape_field(&record.id),
            record.direction.as_str().to_string(),
            record.state.as_str().to_string(),
            record.amount_sat.to_string(),
            record.fee_sat.map(|f| f.to_string()).unwrap_or_default(),
            record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            escape_field(record.description.as_deref().unwrap_or("")),
        ];
        csv.push_str(&fields.join(","));
        csv.push('\n');
    }

    csv
}

/// Write the CSV export to `path`
pub async fn export_to_file(records: &[PaymentRecord], path: &Path) -> Result<usize, String> {
    let csv = export_csv(records);
    tokio::fs::write(path, csv.as_bytes())
        .await
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    info!("Exported {} payments to {}", records.len(), path.display());
    Ok(records.len())
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
