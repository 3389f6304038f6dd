//! Payment records and the direction selectors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a single payment as reported by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    Incoming,
    Outgoing,
    Forwarded,
}

/// Settlement state of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Settled,
    Failed,
    Pending,
}

/// Coarse category selector for the payment list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionTab {
    #[default]
    All,
    Incoming,
    Outgoing,
}

/// A payment as the dashboard shows it. Built once from the wire row and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRecord {
    pub id: String,
    pub direction: PaymentDirection,
    pub state: PaymentState,
    pub amount_sat: u64,
    pub created_at: DateTime<Utc>,
    pub fee_sat: Option<u64>,
    pub description: Option<String>,
}

impl PaymentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDirection::Incoming => "incoming",
            PaymentDirection::Outgoing => "outgoing",
            PaymentDirection::Forwarded => "forwarded",
        }
    }
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Settled => "settled",
            PaymentState::Failed => "failed",
            PaymentState::Pending => "pending",
        }
    }
}

impl DirectionTab {
    pub const ALL: [DirectionTab; 3] =
        [DirectionTab::All, DirectionTab::Incoming, DirectionTab::Outgoing];

    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionTab::All => "all",
            DirectionTab::Incoming => "incoming",
            DirectionTab::Outgoing => "outgoing",
        }
    }

    /// The record direction this tab pins, `None` for the unrestricted tab
    pub fn record_direction(&self) -> Option<PaymentDirection> {
        match self {
            DirectionTab::All => None,
            DirectionTab::Incoming => Some(PaymentDirection::Incoming),
            DirectionTab::Outgoing => Some(PaymentDirection::Outgoing),
        }
    }
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DirectionTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "incoming" | "in" | "received" => Ok(PaymentDirection::Incoming),
            "outgoing" | "out" | "sent" => Ok(PaymentDirection::Outgoing),
            "forwarded" | "forward" => Ok(PaymentDirection::Forwarded),
            other => Err(format!("Unknown payment direction: '{}'", other)),
        }
    }
}

impl FromStr for PaymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // LND reports "succeeded"/"in_flight", CLN "complete"/"pending"
        match s.trim().to_lowercase().as_str() {
            "settled" | "succeeded" | "complete" | "paid" => Ok(PaymentState::Settled),
            "failed" | "canceled" | "cancelled" => Ok(PaymentState::Failed),
            "pending" | "in_flight" | "inflight" | "open" => Ok(PaymentState::Pending),
            other => Err(format!("Unknown settlement state: '{}'", other)),
        }
    }
}

impl FromStr for DirectionTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DirectionTab::All),
            "incoming" | "in" => Ok(DirectionTab::Incoming),
            "outgoing" | "out" => Ok(DirectionTab::Outgoing),
            other => Err(format!("Unknown tab: '{}'. Use: all, incoming, outgoing", other)),
        }
    }
}
