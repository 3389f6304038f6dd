use crate::models::{DirectionTab, PaymentRecord};
use crate::services::price_service::{format_usd, PriceConverter};
use crate::services::{ViewSnapshot, ViewStatus};
use crate::utils::Table;

const ID_WIDTH: usize = 12;

/// Render the payments view: tabs with badge counts, active filter, record table and pager
pub fn render_snapshot(snapshot: &ViewSnapshot, btc_price: Option<f64>) -> String {
    let mut out = String::new();

    let tabs: Vec<String> = DirectionTab::ALL
        .iter()
        .map(|tab| {
            let label = format!("{} {}", tab, snapshot.counts.get(*tab).label());
            if *tab == snapshot.direction {
                format!("[*{}]", label)
            } else {
                format!("[{}]", label)
            }
        })
        .collect();
    out.push_str(&format!("📋 Payments  {}\n", tabs.join(" ")));
    out.push_str(&format!("Filter: {}\n", snapshot.criteria.describe()));

    match snapshot.status {
        ViewStatus::Idle => out.push_str("Not loaded yet. Type `refresh`.\n"),
        ViewStatus::Loading => out.push_str("⏳ Loading...\n"),
        ViewStatus::Error => {
            let reason = snapshot
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            out.push_str(&format!("❌ {}\n", reason));
            if let Some(pending) = &snapshot.pending {
                out.push_str(&format!(
                    "Showing the last loaded page. Not loaded: {} page {} ({})\n",
                    pending.direction,
                    pending.page,
                    pending.criteria.describe()
                ));
            }
        }
        ViewStatus::Ready => {}
    }

    let failed: Vec<String> = DirectionTab::ALL
        .iter()
        .filter(|tab| snapshot.counts.get(**tab).is_failed())
        .map(|tab| tab.to_string())
        .collect();
    if !failed.is_empty() {
        out.push_str(&format!("⚠️ Counts unavailable for: {}\n", failed.join(", ")));
    }

    if snapshot.records.is_empty() {
        if snapshot.status != ViewStatus::Idle {
            out.push_str("No payments found\n");
        }
    } else {
        out.push('\n');
        out.push_str(&render_records(&snapshot.records, btc_price));
        out.push('\n');
    }

    let pagination = &snapshot.pagination;
    let numbers: Vec<String> = pagination
        .page_numbers
        .iter()
        .map(|n| if *n == pagination.page { format!("[{}]", n) } else { n.to_string() })
        .collect();
    out.push_str(&format!(
        "{} {} {}   Page {}/{} ({} total)",
        if pagination.has_prev { "«" } else { " " },
        numbers.join(" "),
        if pagination.has_next { "»" } else { " " },
        pagination.page,
        pagination.total_pages,
        pagination.total_items,
    ));

    out
}

fn render_records(records: &[PaymentRecord], btc_price: Option<f64>) -> String {
    let mut headers =
        vec!["Hash", "Direction", "State", "Amount (sat)", "Fee (sat)", "Created (UTC)"];
    if btc_price.is_some() {
        headers.push("USD");
    }
    headers.push("Description");

    let mut table = Table::new(headers).align_right(3).align_right(4);
    if btc_price.is_some() {
        table = table.align_right(6);
    }

    for record in records {
        let mut row = vec![
            short_id(&record.id),
            record.direction.to_string(),
            record.state.to_string(),
            record.amount_sat.to_string(),
            record.fee_sat.map(|f| f.to_string()).unwrap_or_else(|| "-".to_string()),
            record.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ];
        if let Some(price) = btc_price {
            row.push(format_usd(PriceConverter::sats_to_usd_with_price(record.amount_sat, price)));
        }
        row.push(record.description.clone().unwrap_or_default());
        table.add_row(row);
    }

    table.render()
}

/// First characters of a long payment hash
pub fn short_id(id: &str) -> String {
    if id.chars().count() > ID_WIDTH {
        let head: String = id.chars().take(ID_WIDTH).collect();
        format!("{}…", head)
    } else {
        id.to_string()
    }
}

/// Detail view for a single payment
pub fn render_detail(record: &PaymentRecord, btc_price: Option<f64>) -> String {
    let mut lines = vec![
        format!("🔎 Payment {}", record.id),
        format!("Direction:   {}", record.direction),
        format!("State:       {}", record.state),
        format!("Amount:      {} sat", record.amount_sat),
    ];
    if let Some(price) = btc_price {
        lines.push(format!(
            "             {}",
            format_usd(PriceConverter::sats_to_usd_with_price(record.amount_sat, price))
        ));
    }
    if let Some(fee) = record.fee_sat {
        lines.push(format!("Fee:         {} sat", fee));
    }
    lines.push(format!("Created:     {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC")));
    if let Some(description) = &record.description {
        lines.push(format!("Description: {}", description));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryCounts, CountEntry, FilterCriteria, PaymentDirection, PaymentState};
    use crate::services::view_service::{PaginationView, ViewTarget};
    use chrono::{TimeZone, Utc};

    fn snapshot(records: Vec<PaymentRecord>, status: ViewStatus) -> ViewSnapshot {
        ViewSnapshot {
            records,
            pagination: PaginationView {
                page: 2,
                total_pages: 3,
                total_items: 25,
                page_numbers: vec![1, 2, 3],
                has_next: true,
                has_prev: true,
            },
            counts: CategoryCounts {
                all: CountEntry::fresh(25),
                incoming: CountEntry::failed("boom"),
                outgoing: CountEntry::fresh(7),
            },
            status,
            error: None,
            direction: DirectionTab::Outgoing,
            criteria: FilterCriteria::default(),
            pending: None,
        }
    }

    fn record() -> PaymentRecord {
        PaymentRecord {
            id: "e3b0c44298fc1c149afbf4c8996fb924".to_string(),
            direction: PaymentDirection::Outgoing,
            state: PaymentState::Settled,
            amount_sat: 100_000,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap(),
            fee_sat: Some(12),
            description: Some("coffee".to_string()),
        }
    }

    #[test]
    fn test_render_tabs_and_pager() {
        let rendered = render_snapshot(&snapshot(vec![record()], ViewStatus::Ready), None);
        assert!(rendered.contains("[all 25] [incoming 0!] [*outgoing 7]"));
        assert!(rendered.contains("Filter: none"));
        assert!(rendered.contains("e3b0c44298fc…"));
        assert!(rendered.contains("« 1 [2] 3 »   Page 2/3 (25 total)"));
        assert!(rendered.contains("Counts unavailable for: incoming"));
        assert!(!rendered.contains("USD"));
    }

    #[test]
    fn test_render_error_names_the_view_that_did_not_load() {
        let mut view = snapshot(vec![record()], ViewStatus::Error);
        view.pending = Some(ViewTarget {
            direction: DirectionTab::Incoming,
            criteria: FilterCriteria::default(),
            page: 1,
        });
        let rendered = render_snapshot(&view, None);
        assert!(rendered.contains("[*outgoing 7]"));
        assert!(rendered.contains("Not loaded: incoming page 1 (none)"));
        assert!(rendered.contains("e3b0c44298fc…"));
    }

    #[test]
    fn test_render_with_fiat_column() {
        let view = snapshot(vec![record()], ViewStatus::Ready);
        let rendered = render_snapshot(&view, Some(50_000.0));
        assert!(rendered.contains("USD"));
        assert!(rendered.contains("$50.00"));
    }

    #[test]
    fn test_render_empty_and_loading() {
        let rendered = render_snapshot(&snapshot(Vec::new(), ViewStatus::Loading), None);
        assert!(rendered.contains("Loading"));
        assert!(rendered.contains("No payments found"));
    }

    #[test]
    fn test_render_detail() {
        let detail = render_detail(&record(), None);
        assert!(detail.contains("Fee:         12 sat"));
        assert!(detail.contains("Created:     2024-01-15 08:30:00 UTC"));
    }
}
