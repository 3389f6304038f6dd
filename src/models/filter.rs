//! Filter criteria for the payment list

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::payment::PaymentState;
use crate::utils::errors::InvalidFilterError;

/// Comparison applied to the payment amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericOperator {
    Gte,
    Lte,
    Eq,
}

/// Amount comparison: operator and threshold always travel together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountFilter {
    pub operator: NumericOperator,
    pub value: i64,
}

/// Active filter predicate. `None` on a field means that dimension is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub state: Option<PaymentState>,
    pub amount: Option<AmountFilter>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Holds the criteria currently in force
#[derive(Debug, Default)]
pub struct FilterModel {
    active: FilterCriteria,
}

impl NumericOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumericOperator::Gte => "gte",
            NumericOperator::Lte => "lte",
            NumericOperator::Eq => "eq",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            NumericOperator::Gte => ">=",
            NumericOperator::Lte => "<=",
            NumericOperator::Eq => "=",
        }
    }
}

impl fmt::Display for NumericOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NumericOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gte" | ">=" => Ok(NumericOperator::Gte),
            "lte" | "<=" => Ok(NumericOperator::Lte),
            "eq" | "=" | "==" => Ok(NumericOperator::Eq),
            other => Err(format!("Unknown operator: '{}'. Use: gte, lte, eq", other)),
        }
    }
}

impl FilterCriteria {
    /// True when no dimension is constrained
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.amount.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn validate(&self) -> Result<(), InvalidFilterError> {
        if let Some(amount) = &self.amount {
            if amount.value < 0 {
                return Err(InvalidFilterError::NegativeThreshold(amount.value));
            }
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(InvalidFilterError::InvertedDateRange { from, to });
            }
        }
        Ok(())
    }

    /// Short human summary, e.g. `state=settled amount>=1000 from=2024-01-01`
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }
        let mut parts = Vec::new();
        if let Some(state) = self.state {
            parts.push(format!("state={}", state));
        }
        if let Some(amount) = self.amount {
            parts.push(format!("amount{}{}", amount.operator.symbol(), amount.value));
        }
        if let Some(from) = self.from {
            parts.push(format!("from={}", from));
        }
        if let Some(to) = self.to {
            parts.push(format!("to={}", to));
        }
        parts.join(" ")
    }
}

impl FilterModel {
    pub fn active(&self) -> &FilterCriteria {
        &self.active
    }

    /// Replace the active criteria as a whole. Invalid criteria leave the current ones untouched.
    pub fn apply(&mut self, criteria: FilterCriteria) -> Result<(), InvalidFilterError> {
        criteria.validate()?;
        self.active = criteria;
        Ok(())
    }
}
