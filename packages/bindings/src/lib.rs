use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use capalloc_core::allocation::Allocation;
use capalloc_core::market::MarketAssumptions;
use capalloc_core::screening::{self, ScreeningInput, ScreeningParameters};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Input of `score_allocation`. Capital and tax rate default like a screening run.
#[derive(Debug, Deserialize)]
struct ScoreInput {
    allocation: Allocation,
    #[serde(default)]
    assumptions: Option<MarketAssumptions>,
    capital: Option<Decimal>,
    tax_rate: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Screening
// ---------------------------------------------------------------------------

#[napi]
pub fn screen_allocations(input_json: String) -> NapiResult<String> {
    let input: ScreeningInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = screening::run_screening(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn score_allocation(input_json: String) -> NapiResult<String> {
    let input: ScoreInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let defaults = ScreeningParameters::default();
    let assumptions = input.assumptions.unwrap_or_default();
    let output = screening::score(
        &input.allocation,
        &assumptions,
        input.capital.unwrap_or(defaults.capital),
        input.tax_rate.unwrap_or(defaults.tax_rate),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[napi]
pub fn default_market_assumptions() -> NapiResult<String> {
    serde_json::to_string(&MarketAssumptions::default()).map_err(to_napi_error)
}
