use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::filter::{filter_admissible, recommend};
use super::scoring::{PortfolioScorer, ScoredPortfolio, MAX_CAPITAL};
use crate::allocation::{allocation_count, candidate_count, generate, Allocations};
use crate::error::CapAllocError;
use crate::market::MarketAssumptions;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CapAllocResult;

/// Largest step accepted at the screening boundary.
pub const MAX_SCREENING_STEP: u32 = 20;
/// Upper bound of the shareholder ROE threshold.
pub const MAX_ROE_THRESHOLD: Rate = dec!(0.20);
/// Upper bound of the guaranteed yield threshold.
pub const MAX_YIELD_THRESHOLD: Rate = dec!(0.10);
/// Default cap on the number of allocations scored in one pass.
pub const DEFAULT_MAX_ALLOCATIONS: u64 = 1_000_000;

const LARGE_GRID_WARNING: u64 = 100_000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// User-controlled inputs of a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningParameters {
    /// Capital to allocate, also the equity base of the ROE.
    pub capital: Money,
    /// Tax rate applied to income (not to capital gains).
    pub tax_rate: Rate,
    /// Minimum shareholder ROE.
    pub roe_threshold: Rate,
    /// Minimum guaranteed policyholder yield.
    pub yield_threshold: Rate,
    /// Grid granularity in percentage points.
    pub step: u32,
}

impl Default for ScreeningParameters {
    fn default() -> Self {
        ScreeningParameters {
            capital: dec!(100000000),
            tax_rate: dec!(0.30),
            roe_threshold: dec!(0.10),
            yield_threshold: dec!(0.033),
            step: 10,
        }
    }
}

impl ScreeningParameters {
    pub fn validate(&self) -> CapAllocResult<()> {
        if self.capital <= Decimal::ZERO || self.capital > MAX_CAPITAL {
            return Err(CapAllocError::invalid(
                "capital",
                format!(
                    "Capital must be positive and at most {}, got {}",
                    MAX_CAPITAL, self.capital
                ),
            ));
        }
        check_range("tax_rate", self.tax_rate, Decimal::ZERO, Decimal::ONE)?;
        check_range(
            "roe_threshold",
            self.roe_threshold,
            Decimal::ZERO,
            MAX_ROE_THRESHOLD,
        )?;
        check_range(
            "yield_threshold",
            self.yield_threshold,
            Decimal::ZERO,
            MAX_YIELD_THRESHOLD,
        )?;
        if !(1..=MAX_SCREENING_STEP).contains(&self.step) {
            return Err(CapAllocError::invalid(
                "step",
                format!(
                    "Step must be between 1 and {} percentage points, got {}",
                    MAX_SCREENING_STEP, self.step
                ),
            ));
        }
        Ok(())
    }
}

fn check_range(field: &str, value: Decimal, min: Decimal, max: Decimal) -> CapAllocResult<()> {
    if value < min || value > max {
        return Err(CapAllocError::invalid(
            field,
            format!("Must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

/// Resource bounds for one screening pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningLimits {
    pub max_allocations: u64,
}

impl Default for ScreeningLimits {
    fn default() -> Self {
        ScreeningLimits {
            max_allocations: DEFAULT_MAX_ALLOCATIONS,
        }
    }
}

/// Full input of a screening run. Missing assumptions fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningInput {
    #[serde(default)]
    pub parameters: ScreeningParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<MarketAssumptions>,
    #[serde(default)]
    pub limits: ScreeningLimits,
}

/// Outcome of the minimum-risk search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Recommendation {
    Recommended { portfolio: ScoredPortfolio },
    NoneAdmissible,
}

impl Recommendation {
    pub fn portfolio(&self) -> Option<&ScoredPortfolio> {
        match self {
            Recommendation::Recommended { portfolio } => Some(portfolio),
            Recommendation::NoneAdmissible => None,
        }
    }
}

/// Aggregate figures over a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub allocations_scored: usize,
    pub admissible_count: usize,
    pub min_roe: Option<Rate>,
    pub max_roe: Option<Rate>,
    pub min_risk: Option<Rate>,
    pub max_risk: Option<Rate>,
    /// Highest-ROE admissible portfolio (first one on ties).
    pub max_roe_admissible: Option<ScoredPortfolio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningOutput {
    /// Every scored allocation, in grid order.
    pub portfolios: Vec<ScoredPortfolio>,
    /// Portfolios meeting both thresholds, in grid order.
    pub admissible: Vec<ScoredPortfolio>,
    pub recommendation: Recommendation,
    pub summary: ScreeningSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run a screening pass and wrap it in the standard output envelope.
pub fn run_screening(
    input: &ScreeningInput,
) -> CapAllocResult<ComputationOutput<ScreeningOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let params = &input.parameters;

    let default_assumptions;
    let assumptions = match input.assumptions {
        Some(ref a) => a,
        None => {
            default_assumptions = MarketAssumptions::default();
            &default_assumptions
        }
    };

    let output = screen(params, assumptions, &input.limits)?;

    let expected = allocation_count(params.step);
    if expected == 0 {
        warnings.push(format!(
            "Step {} does not divide 100: no allocation sums to 100%",
            params.step
        ));
    } else if expected > LARGE_GRID_WARNING {
        warnings.push(format!(
            "Large grid: {} allocations scored at step {}",
            expected, params.step
        ));
    }
    if output.recommendation == Recommendation::NoneAdmissible {
        warnings.push(format!(
            "No admissible portfolio: none reaches ROE >= {} and guaranteed yield >= {}",
            params.roe_threshold, params.yield_threshold
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Exhaustive grid search: net-of-tax ROE, covariance risk, Taux + Cash guaranteed yield",
        &serde_json::json!({
            "capital": params.capital.to_string(),
            "tax_rate": params.tax_rate.to_string(),
            "roe_threshold": params.roe_threshold.to_string(),
            "yield_threshold": params.yield_threshold.to_string(),
            "step": params.step,
            "max_allocations": input.limits.max_allocations,
            "custom_assumptions": input.assumptions.is_some(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Generate, score, filter and recommend in one pass.
///
/// All inputs are checked before the grid is generated.
pub fn screen(
    params: &ScreeningParameters,
    assumptions: &MarketAssumptions,
    limits: &ScreeningLimits,
) -> CapAllocResult<ScreeningOutput> {
    params.validate()?;

    let allocations = allocation_count(params.step);
    if allocations > limits.max_allocations {
        warn!(
            step = params.step,
            allocations,
            limit = limits.max_allocations,
            "allocation grid rejected as too large"
        );
        return Err(CapAllocError::ComputationTooLarge {
            step: params.step,
            allocations,
            candidates: candidate_count(params.step),
            limit: limits.max_allocations,
        });
    }

    let scorer = PortfolioScorer::new(assumptions, params.capital, params.tax_rate)?;
    let grid = generate(params.step)?;
    debug!(step = params.step, allocations, "scoring allocation grid");

    let portfolios = score_all(&scorer, grid);
    let admissible = filter_admissible(&portfolios, params.roe_threshold, params.yield_threshold);
    let recommendation = match recommend(&admissible) {
        Some(best) => Recommendation::Recommended {
            portfolio: best.clone(),
        },
        None => Recommendation::NoneAdmissible,
    };
    let summary = summarize(&portfolios, &admissible);

    info!(
        scored = summary.allocations_scored,
        admissible = summary.admissible_count,
        recommended = recommendation.portfolio().is_some(),
        "screening complete"
    );

    Ok(ScreeningOutput {
        portfolios,
        admissible,
        recommendation,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[cfg(not(feature = "parallel"))]
fn score_all(scorer: &PortfolioScorer, grid: Allocations) -> Vec<ScoredPortfolio> {
    grid.map(|a| scorer.score(&a)).collect()
}

/// Indexed parallel collect keeps grid order.
#[cfg(feature = "parallel")]
fn score_all(scorer: &PortfolioScorer, grid: Allocations) -> Vec<ScoredPortfolio> {
    use rayon::prelude::*;

    let allocations: Vec<_> = grid.collect();
    allocations.par_iter().map(|a| scorer.score(a)).collect()
}

fn summarize(portfolios: &[ScoredPortfolio], admissible: &[ScoredPortfolio]) -> ScreeningSummary {
    let roes = || portfolios.iter().map(|p| p.roe);
    let risks = || portfolios.iter().map(|p| p.risk);

    // max_by returns the last maximum; reverse to keep the first.
    let max_roe_admissible = admissible
        .iter()
        .rev()
        .max_by(|a, b| a.roe.cmp(&b.roe))
        .cloned();

    ScreeningSummary {
        allocations_scored: portfolios.len(),
        admissible_count: admissible.len(),
        min_roe: roes().min(),
        max_roe: roes().max(),
        min_risk: risks().min(),
        max_risk: risks().max(),
        max_roe_admissible,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(step: u32, roe: Rate, yld: Rate) -> ScreeningParameters {
        ScreeningParameters {
            step,
            roe_threshold: roe,
            yield_threshold: yld,
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_have_no_admissible_portfolio() {
        let out = run_screening(&ScreeningInput::default()).unwrap();
        assert_eq!(out.result.summary.allocations_scored, 1001);
        assert_eq!(out.result.recommendation, Recommendation::NoneAdmissible);
        assert!(out.result.admissible.is_empty());
        assert!(out
            .warnings
            .iter()
            .any(|w| w.starts_with("No admissible portfolio")));
    }

    #[test]
    fn test_step_50_recommendation() {
        let out = screen(
            &params(50, dec!(0.02), dec!(0.01)),
            &MarketAssumptions::default(),
            &ScreeningLimits::default(),
        )
        .unwrap();
        assert_eq!(out.portfolios.len(), 15);
        assert_eq!(out.admissible.len(), 3);
        let best = out.recommendation.portfolio().unwrap();
        assert_eq!(best.allocation.percentages(), [50, 0, 0, 50, 0]);
        let top = out.summary.max_roe_admissible.unwrap();
        assert_eq!(top.allocation.percentages(), [50, 0, 50, 0, 0]);
        assert_eq!(out.summary.max_roe, Some(dec!(0.078)));
    }

    #[test]
    fn test_rejects_step_one() {
        let err = screen(
            &params(1, dec!(0.1), dec!(0.03)),
            &MarketAssumptions::default(),
            &ScreeningLimits::default(),
        )
        .unwrap_err();
        match err {
            CapAllocError::ComputationTooLarge {
                allocations,
                candidates,
                ..
            } => {
                assert_eq!(allocations, 4_598_126);
                assert_eq!(candidates, 10_510_100_501);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_custom_limit() {
        let limits = ScreeningLimits {
            max_allocations: 100,
        };
        let p = params(10, dec!(0.1), dec!(0.03));
        assert!(screen(&p, &MarketAssumptions::default(), &limits).is_err());
        let p = params(25, dec!(0.1), dec!(0.03));
        assert!(screen(&p, &MarketAssumptions::default(), &limits).is_ok());
    }

    #[test]
    fn test_non_divisor_step_warns() {
        let input = ScreeningInput {
            parameters: params(7, dec!(0.02), dec!(0.01)),
            ..Default::default()
        };
        let out = run_screening(&input).unwrap();
        assert!(out.result.portfolios.is_empty());
        assert_eq!(out.result.summary.min_risk, None);
        assert!(out.warnings.iter().any(|w| w.contains("does not divide 100")));
    }

    #[test]
    fn test_parameter_domains() {
        let bad = [
            ScreeningParameters {
                capital: Decimal::ZERO,
                ..Default::default()
            },
            ScreeningParameters {
                capital: Decimal::MAX,
                ..Default::default()
            },
            ScreeningParameters {
                tax_rate: dec!(1.5),
                ..Default::default()
            },
            ScreeningParameters {
                roe_threshold: dec!(0.25),
                ..Default::default()
            },
            ScreeningParameters {
                yield_threshold: dec!(-0.01),
                ..Default::default()
            },
            ScreeningParameters {
                step: 21,
                ..Default::default()
            },
            ScreeningParameters {
                step: 0,
                ..Default::default()
            },
        ];
        for p in &bad {
            assert!(p.validate().is_err(), "{:?}", p);
        }
        ScreeningParameters::default().validate().unwrap();
    }

    #[test]
    fn test_error_names_field() {
        let p = ScreeningParameters {
            tax_rate: dec!(2),
            ..Default::default()
        };
        match p.validate().unwrap_err() {
            CapAllocError::InvalidInput { field, reason } => {
                assert_eq!(field, "tax_rate");
                assert!(reason.contains("between 0 and 1"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_partial_json_input() {
        let input: ScreeningInput =
            serde_json::from_str(r#"{"parameters": {"step": 25, "roe_threshold": "0.02"}}"#)
                .unwrap();
        assert_eq!(input.parameters.step, 25);
        assert_eq!(input.parameters.roe_threshold, dec!(0.02));
        assert_eq!(input.parameters.tax_rate, dec!(0.30));
        assert_eq!(input.limits.max_allocations, DEFAULT_MAX_ALLOCATIONS);
        assert!(input.assumptions.is_none());
    }

    #[test]
    fn test_recommendation_serializes_status() {
        let json = serde_json::to_value(Recommendation::NoneAdmissible).unwrap();
        assert_eq!(json, serde_json::json!({"status": "none_admissible"}));
    }
}
