use chrono::NaiveDate;

use crate::models::{AmountFilter, FilterCriteria, NumericOperator, PaymentState};

/// Parse `filter` arguments into criteria
///
/// Accepts `key=value` pairs: `state=settled`, `op=gte`, `value=1000`,
/// `from=2024-01-01`, `to=2024-01-31`. The amount may also be written as
/// `amount>=1000`, `amount<=1000` or `amount=1000`. Keys not given stay unconstrained.
pub fn parse_filter_args(args: &[&str]) -> Result<FilterCriteria, String> {
    if args.is_empty() {
        return Err(
            "❌ No filter given. Example: `filter state=settled amount>=1000 from=2024-01-01`"
                .to_string(),
        );
    }

    let mut criteria = FilterCriteria::default();
    let mut operator: Option<NumericOperator> = None;
    let mut value: Option<i64> = None;

    for arg in args {
        if let Some(rest) = arg.strip_prefix("amount") {
            let (op, raw) = split_amount(rest)?;
            operator = Some(op);
            value = Some(parse_amount(raw)?);
            continue;
        }

        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| format!("❌ Expected key=value, got '{}'", arg))?;

        match key.to_lowercase().as_str() {
            "state" | "status" => {
                let state = raw.parse::<PaymentState>().map_err(|e| format!("❌ {}", e))?;
                criteria.state = Some(state)
            }
            "op" | "operator" => {
                operator = Some(raw.parse::<NumericOperator>().map_err(|e| format!("❌ {}", e))?)
            }
            "value" => value = Some(parse_amount(raw)?),
            "from" => criteria.from = Some(parse_date(raw)?),
            "to" => criteria.to = Some(parse_date(raw)?),
            other => {
                return Err(format!(
                    "❌ Unknown filter key: '{}'. Use: state, op, value, from, to",
                    other
                ))
            }
        }
    }

    criteria.amount = match (operator, value) {
        (Some(operator), Some(value)) => Some(AmountFilter { operator, value }),
        (None, None) => None,
        (Some(_), None) => return Err("❌ Operator given without a value".to_string()),
        (None, Some(_)) => return Err("❌ Value given without an operator".to_string()),
    };

    Ok(criteria)
}

fn split_amount(rest: &str) -> Result<(NumericOperator, &str), String> {
    let operators = [
        (">=", NumericOperator::Gte),
        ("<=", NumericOperator::Lte),
        ("=", NumericOperator::Eq),
    ];
    for (prefix, op) in operators {
        if let Some(raw) = rest.strip_prefix(prefix) {
            return Ok((op, raw));
        }
    }
    Err(format!("❌ Invalid amount filter 'amount{}'. Use amount>=N, amount<=N or amount=N", rest))
}

fn parse_amount(raw: &str) -> Result<i64, String> {
    let cleaned = raw.trim().replace('_', "");
    cleaned
        .parse::<i64>()
        .map_err(|_| format!("❌ Invalid amount: '{}'. Use a whole number of sats", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("❌ Invalid date: '{}'. Use YYYY-MM-DD", raw))
}
