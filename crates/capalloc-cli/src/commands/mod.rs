pub mod grid;
pub mod score;
pub mod screen;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use capalloc_core::allocation::{Allocation, AssetClass};
use capalloc_core::market::MarketAssumptions;
use capalloc_core::screening::ScoredPortfolio;

use crate::input;

/// Decimal places kept for rates in row output.
const RATE_DP: u32 = 8;
/// Decimal places kept for money in row output.
const MONEY_DP: usize = 2;

/// Print the default market assumptions (usable as an `--assumptions` file).
pub fn run_assumptions() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(MarketAssumptions::default())?)
}

/// Load assumptions from a file, or fall back to the defaults.
pub(crate) fn load_assumptions(
    path: &Option<String>,
) -> Result<MarketAssumptions, Box<dyn std::error::Error>> {
    match path {
        Some(p) => input::load(p),
        None => Ok(MarketAssumptions::default()),
    }
}

/// One column per asset class, holding whole percentages.
pub(crate) fn allocation_columns(allocation: &Allocation) -> Map<String, Value> {
    AssetClass::ALL
        .iter()
        .map(|a| (a.name().to_string(), Value::from(allocation.percent(*a))))
        .collect()
}

/// Flat row: asset percentages, then ROE, risk and guaranteed yield.
pub(crate) fn portfolio_row(p: &ScoredPortfolio) -> Value {
    let mut row = allocation_columns(&p.allocation);
    row.insert("roe".into(), rate(p.roe));
    row.insert("risk".into(), rate(p.risk));
    row.insert("guaranteed_yield".into(), rate(p.guaranteed_yield));
    Value::Object(row)
}

/// Row plus the monetary breakdown behind the ROE.
pub(crate) fn portfolio_detail(p: &ScoredPortfolio) -> Map<String, Value> {
    let mut detail = match portfolio_row(p) {
        Value::Object(m) => m,
        _ => Map::new(),
    };
    detail.insert("gross_income".into(), money(p.gross_income));
    detail.insert("net_income".into(), money(p.net_income));
    detail.insert("capital_gain".into(), money(p.capital_gain));
    detail
}

pub(crate) fn rate(d: Decimal) -> Value {
    Value::String(d.round_dp(RATE_DP).normalize().to_string())
}

pub(crate) fn money(d: Decimal) -> Value {
    Value::String(format!("{:.*}", MONEY_DP, d))
}
