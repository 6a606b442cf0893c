use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::{Allocation, AssetClass, ASSET_COUNT};
use crate::error::CapAllocError;
use crate::market::MarketAssumptions;
use crate::math::{quadratic_form, sqrt_decimal, vec_dot};
use crate::types::{Money, Rate};
use crate::CapAllocResult;

/// Largest capital accepted. With yields bounded by the market assumptions
/// this keeps every money amount well inside `Decimal` range.
pub const MAX_CAPITAL: Money = dec!(1_000_000_000_000_000_000);

/// One allocation with its return, risk and guaranteed-yield scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPortfolio {
    pub allocation: Allocation,
    /// Allocation as fractions of one, in asset-class order.
    pub weights: [Decimal; ASSET_COUNT],
    /// (net income + capital gain) / capital.
    pub roe: Rate,
    /// Portfolio standard deviation sqrt(w' * Sigma * w).
    pub risk: Rate,
    /// Income yield of the Taux and Cash sleeve only.
    pub guaranteed_yield: Rate,
    pub gross_income: Money,
    pub net_income: Money,
    pub capital_gain: Money,
}

impl ScoredPortfolio {
    /// Both thresholds met (inclusive).
    pub fn is_admissible(&self, roe_threshold: Rate, yield_threshold: Rate) -> bool {
        self.roe >= roe_threshold && self.guaranteed_yield >= yield_threshold
    }
}

/// Scores allocations against a fixed set of assumptions, capital and tax rate.
///
/// Inputs are validated once in `new`; `score` cannot fail afterwards.
#[derive(Debug, Clone)]
pub struct PortfolioScorer {
    capital: Money,
    tax_rate: Rate,
    income_yields: Vec<Rate>,
    capital_gain_yields: Vec<Rate>,
    guaranteed_income_yields: Vec<Rate>,
    covariance: Vec<Vec<Decimal>>,
}

impl PortfolioScorer {
    pub fn new(
        assumptions: &MarketAssumptions,
        capital: Money,
        tax_rate: Rate,
    ) -> CapAllocResult<Self> {
        if capital <= Decimal::ZERO || capital > MAX_CAPITAL {
            return Err(CapAllocError::invalid(
                "capital",
                format!(
                    "Capital must be positive and at most {}, got {}",
                    MAX_CAPITAL, capital
                ),
            ));
        }
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE {
            return Err(CapAllocError::invalid(
                "tax_rate",
                format!("Tax rate must be between 0 and 1, got {}", tax_rate),
            ));
        }
        assumptions.validate()?;

        let income_yields = assumptions.income_yields();
        let guaranteed_income_yields = AssetClass::ALL
            .iter()
            .zip(income_yields.iter())
            .map(|(asset, y)| {
                if asset.is_guaranteed() {
                    *y
                } else {
                    Decimal::ZERO
                }
            })
            .collect();

        Ok(PortfolioScorer {
            capital,
            tax_rate,
            income_yields,
            capital_gain_yields: assumptions.capital_gain_yields(),
            guaranteed_income_yields,
            covariance: assumptions.covariance_matrix(),
        })
    }

    pub fn capital(&self) -> Money {
        self.capital
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    pub fn score(&self, allocation: &Allocation) -> ScoredPortfolio {
        let weights = allocation.weights();

        let gross_income = self.capital * vec_dot(&weights, &self.income_yields);
        let capital_gain = self.capital * vec_dot(&weights, &self.capital_gain_yields);
        let net_income = gross_income * (Decimal::ONE - self.tax_rate);
        let roe = (net_income + capital_gain) / self.capital;

        let risk = sqrt_decimal(quadratic_form(&weights, &self.covariance));
        let guaranteed_yield = vec_dot(&weights, &self.guaranteed_income_yields);

        ScoredPortfolio {
            allocation: *allocation,
            weights,
            roe,
            risk,
            guaranteed_yield,
            gross_income,
            net_income,
            capital_gain,
        }
    }
}

/// Score a single allocation.
pub fn score(
    allocation: &Allocation,
    assumptions: &MarketAssumptions,
    capital: Money,
    tax_rate: Rate,
) -> CapAllocResult<ScoredPortfolio> {
    let scorer = PortfolioScorer::new(assumptions, capital, tax_rate)?;
    Ok(scorer.score(allocation))
}
