//! In-memory payment backend for service tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use tokio::sync::oneshot;

use crate::api::dashboard::models::{WireData, WireNumber, WirePage, WirePayment, WireTimestamp};
use crate::api::dashboard::{ApiError, PaymentEnvelope, PaymentQuery};
use crate::api::PaymentSource;
use crate::models::{DirectionTab, NumericOperator, PaymentDirection, PaymentState};

/// Wire row created at noon UTC on `date`
pub fn payment(
    id: &str,
    direction: PaymentDirection,
    state: PaymentState,
    amount_sat: u64,
    date: &str,
) -> WirePayment {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let noon = Utc.from_utc_datetime(&day.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
    WirePayment {
        id: Some(id.to_string()),
        direction: Some(direction.as_str().to_string()),
        state: Some(state.as_str().to_string()),
        amount_sat: Some(WireNumber::Int(amount_sat as i64)),
        creation_date: Some(WireTimestamp::Unix(noon.timestamp())),
        fee_sat: None,
        description: None,
    }
}

/// Filters and pages like the real backend. Tabs can be made to fail and pages can be held
/// back until the test releases them.
#[derive(Default)]
pub struct FakeSource {
    rows: Mutex<Vec<WirePayment>>,
    failing: Mutex<HashSet<DirectionTab>>,
    queries: Mutex<Vec<PaymentQuery>>,
    gates: Mutex<HashMap<u32, oneshot::Receiver<()>>>,
    count_gates: Mutex<HashMap<DirectionTab, oneshot::Receiver<()>>>,
}

impl FakeSource {
    pub fn new(rows: Vec<WirePayment>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn set_rows(&self, rows: Vec<WirePayment>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn fail(&self, tab: DirectionTab) {
        self.failing.lock().unwrap().insert(tab);
    }

    pub fn recover(&self, tab: DirectionTab) {
        self.failing.lock().unwrap().remove(&tab);
    }

    pub fn queries(&self) -> Vec<PaymentQuery> {
        self.queries.lock().unwrap().clone()
    }

    /// Hold the next request for `page` until the returned sender fires
    pub fn gate(&self, page: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(page, rx);
        tx
    }

    /// Hold the next badge count request for `tab` until the returned sender fires
    pub fn gate_count(&self, tab: DirectionTab) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.count_gates.lock().unwrap().insert(tab, rx);
        tx
    }

    fn matches(row: &WirePayment, query: &PaymentQuery) -> bool {
        let Ok(record) = row.clone().normalize(None) else {
            return false;
        };
        if let Some(direction) = query.direction.record_direction() {
            if record.direction != direction {
                return false;
            }
        }
        if let Some(state) = query.criteria.state {
            if record.state != state {
                return false;
            }
        }
        if let Some(amount) = query.criteria.amount {
            let value = amount.value as u64;
            let ok = match amount.operator {
                NumericOperator::Gte => record.amount_sat >= value,
                NumericOperator::Lte => record.amount_sat <= value,
                NumericOperator::Eq => record.amount_sat == value,
            };
            if !ok {
                return false;
            }
        }
        let day = record.created_at.date_naive();
        if query.criteria.from.is_some_and(|from| day < from) {
            return false;
        }
        if query.criteria.to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }
}

#[async_trait]
impl PaymentSource for FakeSource {
    async fn list_payments(&self, query: &PaymentQuery) -> Result<PaymentEnvelope, ApiError> {
        self.queries.lock().unwrap().push(query.clone());

        let count_gate = if query.per_page == 1 && query.criteria.is_empty() {
            self.count_gates.lock().unwrap().remove(&query.direction)
        } else {
            None
        };
        let gate = count_gate.or_else(|| self.gates.lock().unwrap().remove(&query.page));
        if let Some(rx) = gate {
            let _ = rx.await;
        }

        if self.failing.lock().unwrap().contains(&query.direction) {
            return Err(ApiError::ServerError(503, "node unreachable".to_string()));
        }

        let matching: Vec<WirePayment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| Self::matches(row, query))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let skip = ((query.page - 1) * query.per_page) as usize;
        let items = matching.into_iter().skip(skip).take(query.per_page as usize).collect();

        Ok(PaymentEnvelope {
            success: Some(true),
            message: None,
            data: Some(WireData::Page(WirePage { items, total: Some(total) })),
            pagination: None,
        })
    }
}
