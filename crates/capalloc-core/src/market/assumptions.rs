use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::allocation::{AssetClass, ASSET_COUNT};
use crate::error::CapAllocError;
use crate::math::ldl_pivots;
use crate::types::Rate;
use crate::CapAllocResult;

/// Income and capital-gain yields must lie in [-MAX_YIELD, MAX_YIELD].
pub const MAX_YIELD: Rate = dec!(1);
/// Volatilities must lie in [0, MAX_VOLATILITY].
pub const MAX_VOLATILITY: Rate = dec!(10);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Expected behaviour of a single asset class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAssumption {
    pub asset_class: AssetClass,
    /// Annual income yield (coupons, dividends, rents).
    pub income_yield: Rate,
    /// Annual capital-gain yield.
    pub capital_gain_yield: Rate,
    /// Annualised standard deviation of returns.
    pub volatility: Rate,
}

/// Market assumptions for the five asset classes.
///
/// `assets` follows `AssetClass::ALL` order; `correlation` is indexed the same
/// way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAssumptions {
    pub assets: Vec<AssetAssumption>,
    pub correlation: Vec<Vec<Decimal>>,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        let asset = |asset_class: AssetClass,
                     income_yield: Rate,
                     capital_gain_yield: Rate,
                     volatility: Rate| AssetAssumption {
            asset_class,
            income_yield,
            capital_gain_yield,
            volatility,
        };
        MarketAssumptions {
            assets: vec![
                asset(AssetClass::Taux, dec!(0.02), dec!(0.0), dec!(0.01)),
                asset(AssetClass::ActionsCotees, dec!(0.03), dec!(0.04), dec!(0.15)),
                asset(AssetClass::ActionsNonCotees, dec!(0.04), dec!(0.05), dec!(0.20)),
                asset(AssetClass::Immobilier, dec!(0.035), dec!(0.03), dec!(0.10)),
                asset(AssetClass::Cash, dec!(0.005), dec!(0.0), dec!(0.005)),
            ],
            correlation: vec![
                vec![dec!(1.0), dec!(0.2), dec!(0.15), dec!(0.1), dec!(0.05)],
                vec![dec!(0.2), dec!(1.0), dec!(0.6), dec!(0.4), dec!(0.05)],
                vec![dec!(0.15), dec!(0.6), dec!(1.0), dec!(0.5), dec!(0.05)],
                vec![dec!(0.1), dec!(0.4), dec!(0.5), dec!(1.0), dec!(0.05)],
                vec![dec!(0.05), dec!(0.05), dec!(0.05), dec!(0.05), dec!(1.0)],
            ],
        }
    }
}

impl MarketAssumptions {
    pub fn asset(&self, asset_class: AssetClass) -> &AssetAssumption {
        &self.assets[asset_class.index()]
    }

    pub fn income_yields(&self) -> Vec<Rate> {
        self.assets.iter().map(|a| a.income_yield).collect()
    }

    pub fn capital_gain_yields(&self) -> Vec<Rate> {
        self.assets.iter().map(|a| a.capital_gain_yield).collect()
    }

    pub fn volatilities(&self) -> Vec<Rate> {
        self.assets.iter().map(|a| a.volatility).collect()
    }

    /// Covariance matrix: vol[i] * vol[j] * corr[i][j].
    pub fn covariance_matrix(&self) -> Vec<Vec<Decimal>> {
        let vols = self.volatilities();
        self.correlation
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, rho)| vols[i] * vols[j] * *rho)
                    .collect()
            })
            .collect()
    }

    /// Check shape, ordering, per-asset bounds and the correlation matrix
    /// (unit diagonal, entries in [-1, 1], symmetric, positive semi-definite).
    ///
    /// The bounds keep every covariance and money product within `Decimal`
    /// range, so scoring never overflows once this passes.
    pub fn validate(&self) -> CapAllocResult<()> {
        if self.assets.len() != ASSET_COUNT {
            return Err(CapAllocError::invalid(
                "assets",
                format!(
                    "Expected {} asset classes but got {}",
                    ASSET_COUNT,
                    self.assets.len()
                ),
            ));
        }
        for (i, (a, expected)) in self.assets.iter().zip(AssetClass::ALL).enumerate() {
            if a.asset_class != expected {
                return Err(CapAllocError::invalid(
                    format!("assets[{}]", i),
                    format!("Expected {} at position {}, found {}", expected, i, a.asset_class),
                ));
            }
            check_bound(
                format!("assets[{}].income_yield", i),
                a.income_yield,
                -MAX_YIELD,
                MAX_YIELD,
            )?;
            check_bound(
                format!("assets[{}].capital_gain_yield", i),
                a.capital_gain_yield,
                -MAX_YIELD,
                MAX_YIELD,
            )?;
            check_bound(
                format!("assets[{}].volatility", i),
                a.volatility,
                Decimal::ZERO,
                MAX_VOLATILITY,
            )?;
        }
        validate_correlation_matrix(&self.correlation)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_bound(field: String, value: Decimal, min: Decimal, max: Decimal) -> CapAllocResult<()> {
    if value < min || value > max {
        return Err(CapAllocError::invalid(
            field,
            format!("Must be between {} and {}, got {}", min, max, value),
        ));
    }
    Ok(())
}

#[allow(clippy::needless_range_loop)]
fn validate_correlation_matrix(corr: &[Vec<Decimal>]) -> CapAllocResult<()> {
    let n = ASSET_COUNT;
    if corr.len() != n {
        return Err(CapAllocError::invalid(
            "correlation",
            format!("Expected {}x{} matrix but got {} rows", n, n, corr.len()),
        ));
    }
    for (i, row) in corr.iter().enumerate() {
        if row.len() != n {
            return Err(CapAllocError::invalid(
                "correlation",
                format!("Row {} has {} columns, expected {}", i, row.len(), n),
            ));
        }
    }

    let tolerance = dec!(0.000000001);
    for i in 0..n {
        if (corr[i][i] - Decimal::ONE).abs() > tolerance {
            return Err(CapAllocError::invalid(
                "correlation",
                format!("Diagonal [{},{}] must be 1, got {}", i, i, corr[i][i]),
            ));
        }
        for j in 0..n {
            if corr[i][j] < -Decimal::ONE || corr[i][j] > Decimal::ONE {
                return Err(CapAllocError::invalid(
                    "correlation",
                    format!("[{},{}]={} is outside [-1, 1]", i, j, corr[i][j]),
                ));
            }
        }
        for j in (i + 1)..n {
            if (corr[i][j] - corr[j][i]).abs() > tolerance {
                return Err(CapAllocError::invalid(
                    "correlation",
                    format!(
                        "Not symmetric: [{},{}]={} != [{},{}]={}",
                        i, j, corr[i][j], j, i, corr[j][i]
                    ),
                ));
            }
        }
    }

    let pivots = ldl_pivots(corr, tolerance);
    if let Some(p) = pivots.iter().find(|p| **p < -tolerance) {
        return Err(CapAllocError::invalid(
            "correlation",
            format!("Matrix is not positive semi-definite (pivot {})", p),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        MarketAssumptions::default().validate().unwrap();
    }

    #[test]
    fn test_covariance_diagonal_is_variance() {
        let m = MarketAssumptions::default();
        let cov = m.covariance_matrix();
        assert_eq!(cov[4][4], dec!(0.000025));
        assert_eq!(cov[1][2], dec!(0.15) * dec!(0.20) * dec!(0.6));
        assert_eq!(cov[1][2], cov[2][1]);
    }

    #[test]
    fn test_lookup_by_class() {
        let m = MarketAssumptions::default();
        assert_eq!(m.asset(AssetClass::Immobilier).income_yield, dec!(0.035));
        assert_eq!(m.asset(AssetClass::Cash).volatility, dec!(0.005));
    }

    #[test]
    fn test_rejects_wrong_order() {
        let mut m = MarketAssumptions::default();
        m.assets.swap(0, 4);
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_rejects_asymmetric() {
        let mut m = MarketAssumptions::default();
        m.correlation[0][1] = dec!(0.3);
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_diagonal() {
        let mut m = MarketAssumptions::default();
        m.correlation[2][2] = dec!(0.9);
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_rejects_not_psd() {
        let mut m = MarketAssumptions::default();
        for (i, j) in [(1, 2), (1, 3), (2, 3)] {
            m.correlation[i][j] = dec!(-0.9);
            m.correlation[j][i] = dec!(-0.9);
        }
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("positive semi-definite"));
    }

    #[test]
    fn test_rejects_negative_volatility() {
        let mut m = MarketAssumptions::default();
        m.assets[3].volatility = dec!(-0.1);
        assert!(m.validate().is_err());
    }

    #[test]
    fn test_rejects_extreme_volatility() {
        let mut m = MarketAssumptions::default();
        m.assets[1].volatility = dec!(1_000_000_000_000_000);
        let err = m.validate().unwrap_err();
        assert!(err.to_string().contains("assets[1].volatility"));
    }

    #[test]
    fn test_rejects_yields_outside_unit_range() {
        let mut m = MarketAssumptions::default();
        m.assets[2].income_yield = dec!(1.5);
        assert!(m.validate().unwrap_err().to_string().contains("assets[2].income_yield"));

        let mut m = MarketAssumptions::default();
        m.assets[0].capital_gain_yield = dec!(-2);
        assert!(m
            .validate()
            .unwrap_err()
            .to_string()
            .contains("assets[0].capital_gain_yield"));
    }

    #[test]
    fn test_accepts_bounds_inclusive() {
        let mut m = MarketAssumptions::default();
        m.assets[1].income_yield = MAX_YIELD;
        m.assets[1].capital_gain_yield = -MAX_YIELD;
        m.assets[1].volatility = MAX_VOLATILITY;
        m.validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip_keeps_order() {
        let m = MarketAssumptions::default();
        let json = serde_json::to_string(&m).unwrap();
        let back: MarketAssumptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
