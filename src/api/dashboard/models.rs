use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::models::{DirectionTab, FilterCriteria, PaymentDirection, PaymentRecord, PaymentState};

/// Query for GET /payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentQuery {
    pub direction: DirectionTab,
    pub criteria: FilterCriteria,
    pub page: u32,
    pub per_page: u32,
}

/// Response body of GET /payments. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentEnvelope {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<WireData>,
    pub pagination: Option<PaginationMeta>,
}

/// `data` is either `{ items, total }` or a bare row array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireData {
    Rows(Vec<WirePayment>),
    Page(WirePage),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePage {
    #[serde(default)]
    pub items: Vec<WirePayment>,
    pub total: Option<u64>,
}

/// Pagination metadata as the backend reports it. Only the total is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationMeta {
    pub total_items: Option<u64>,
}

/// Single payment row as sent by LND- or CLN-backed nodes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WirePayment {
    #[serde(alias = "payment_hash")]
    pub id: Option<String>,
    pub direction: Option<String>,
    #[serde(alias = "status")]
    pub state: Option<String>,
    #[serde(alias = "value", alias = "amount")]
    pub amount_sat: Option<WireNumber>,
    #[serde(alias = "created_at")]
    pub creation_date: Option<WireTimestamp>,
    #[serde(alias = "fee")]
    pub fee_sat: Option<WireNumber>,
    #[serde(alias = "memo")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Unix(i64),
    Text(String),
}

/// Body of GET /payments, accepting a bare array as well as the envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListBody {
    Rows(Vec<WirePayment>),
    Envelope(PaymentEnvelope),
}

/// Body of GET /payments/{id}
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DetailBody {
    Envelope { data: WirePayment },
    Bare(WirePayment),
}

/// Rows and total after the wire payload has been normalized
#[derive(Debug, Clone, Default)]
pub struct NormalizedPage {
    pub records: Vec<PaymentRecord>,
    pub total_items: u64,
    pub skipped: Vec<NormalizeError>,
}

/// A wire row that could not become a `PaymentRecord`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Missing field `{0}`")]
    MissingField(&'static str),
    #[error("Invalid `{field}`: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Comprehensive error type for API operations
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Rate Limited. Retry after {retry_after_secs} s")]
    RateLimited { retry_after_secs: u64 },
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// 2xx response whose envelope says `success: false`
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Request Error: {0}")]
    RequestError(String),
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}

impl PaymentQuery {
    pub fn new(
        direction: DirectionTab,
        criteria: &FilterCriteria,
        page: u32,
        per_page: u32,
    ) -> Self {
        Self {
            direction,
            criteria: criteria.clone(),
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Query-string pairs. Unset dimensions are left out entirely.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(direction) = self.direction.record_direction() {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        if let Some(state) = self.criteria.state {
            pairs.push(("states", state.as_str().to_string()));
        }
        if let Some(amount) = self.criteria.amount {
            pairs.push(("operator", amount.operator.as_str().to_string()));
            pairs.push(("value", amount.value.to_string()));
        }
        if let Some(from) = self.criteria.from {
            pairs.push(("from", start_of_day(from).to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(to) = self.criteria.to {
            pairs.push(("to", end_of_day(to).to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::days(1) - Duration::seconds(1)
}

impl From<ListBody> for PaymentEnvelope {
    fn from(body: ListBody) -> Self {
        match body {
            ListBody::Envelope(envelope) => envelope,
            ListBody::Rows(rows) => PaymentEnvelope {
                data: Some(WireData::Rows(rows)),
                ..Default::default()
            },
        }
    }
}

impl From<DetailBody> for WirePayment {
    fn from(body: DetailBody) -> Self {
        match body {
            DetailBody::Envelope { data } => data,
            DetailBody::Bare(row) => row,
        }
    }
}

impl PaymentEnvelope {
    /// Total from `data.total`, then `pagination.total_items`, then the row count
    pub fn total_items(&self) -> u64 {
        let explicit = match &self.data {
            Some(WireData::Page(page)) => page.total,
            _ => None,
        };
        explicit
            .or_else(|| self.pagination.as_ref().and_then(|p| p.total_items))
            .unwrap_or_else(|| self.rows().len() as u64)
    }

    pub fn rows(&self) -> &[WirePayment] {
        match &self.data {
            Some(WireData::Rows(rows)) => rows,
            Some(WireData::Page(page)) => &page.items,
            None => &[],
        }
    }

    /// Convert into domain records. `tab` supplies the direction for rows that omit it.
    pub fn normalize(self, tab: DirectionTab) -> NormalizedPage {
        let total_items = self.total_items();
        let rows = match self.data {
            Some(WireData::Rows(rows)) => rows,
            Some(WireData::Page(page)) => page.items,
            None => Vec::new(),
        };

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = Vec::new();
        for row in rows {
            match row.normalize(tab.record_direction()) {
                Ok(record) => records.push(record),
                Err(e) => skipped.push(e),
            }
        }

        NormalizedPage { records, total_items, skipped }
    }
}

impl WirePayment {
    pub fn normalize(
        self,
        fallback_direction: Option<PaymentDirection>,
    ) -> Result<PaymentRecord, NormalizeError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(NormalizeError::MissingField("id"))?;

        let direction = match self.direction {
            Some(raw) => raw
                .parse::<PaymentDirection>()
                .map_err(|_| NormalizeError::InvalidField { field: "direction", value: raw })?,
            None => fallback_direction.ok_or(NormalizeError::MissingField("direction"))?,
        };

        let raw_state = self.state.ok_or(NormalizeError::MissingField("state"))?;
        let state = raw_state
            .parse::<PaymentState>()
            .map_err(|_| NormalizeError::InvalidField { field: "state", value: raw_state })?;

        let amount_sat = self
            .amount_sat
            .ok_or(NormalizeError::MissingField("amount_sat"))?
            .to_sats("amount_sat")?;

        let created_at = self
            .creation_date
            .ok_or(NormalizeError::MissingField("creation_date"))?
            .to_datetime()?;

        let fee_sat = self.fee_sat.map(|fee| fee.to_sats("fee_sat")).transpose()?;
        let description = self.description.filter(|d| !d.trim().is_empty());

        Ok(PaymentRecord {
            id,
            direction,
            state,
            amount_sat,
            created_at,
            fee_sat,
            description,
        })
    }
}

impl WireNumber {
    fn to_sats(&self, field: &'static str) -> Result<u64, NormalizeError> {
        let invalid = || NormalizeError::InvalidField { field, value: self.to_string() };
        match self {
            WireNumber::Int(n) => u64::try_from(*n).map_err(|_| invalid()),
            WireNumber::Float(f) if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 => Ok(*f as u64),
            WireNumber::Float(_) => Err(invalid()),
            WireNumber::Text(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
        }
    }
}

impl std::fmt::Display for WireNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireNumber::Int(n) => write!(f, "{}", n),
            WireNumber::Float(n) => write!(f, "{}", n),
            WireNumber::Text(s) => write!(f, "{}", s),
        }
    }
}

impl WireTimestamp {
    fn to_datetime(&self) -> Result<DateTime<Utc>, NormalizeError> {
        match self {
            WireTimestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0).ok_or_else(|| {
                NormalizeError::InvalidField { field: "creation_date", value: secs.to_string() }
            }),
            WireTimestamp::Text(text) => {
                if let Ok(secs) = text.trim().parse::<i64>() {
                    return WireTimestamp::Unix(secs).to_datetime();
                }
                DateTime::parse_from_rfc3339(text.trim())
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| NormalizeError::InvalidField {
                        field: "creation_date",
                        value: text.clone(),
                    })
            }
        }
    }
}
