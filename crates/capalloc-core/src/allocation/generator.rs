use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::asset_class::{AssetClass, ASSET_COUNT};
use crate::error::CapAllocError;
use crate::types::Percent;
use crate::CapAllocResult;

/// Every allocation sums to this many percentage points.
pub const TOTAL_PERCENT: Percent = 100;

/// Smallest and largest grid steps the generator accepts.
pub const MIN_STEP: u32 = 1;
pub const MAX_STEP: u32 = 100;

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// One candidate portfolio: whole percentage points per asset class, in
/// `AssetClass::ALL` order, summing to exactly 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    into = "[Percent; ASSET_COUNT]",
    try_from = "[Percent; ASSET_COUNT]"
)]
pub struct Allocation([Percent; ASSET_COUNT]);

impl Allocation {
    /// Build an allocation from percentages, rejecting any that do not sum to 100.
    pub fn new(percentages: [Percent; ASSET_COUNT]) -> CapAllocResult<Self> {
        let total: Percent = percentages.iter().sum();
        if total != TOTAL_PERCENT {
            return Err(CapAllocError::invalid(
                "allocation",
                format!(
                    "Percentages must sum to {} but sum to {}",
                    TOTAL_PERCENT, total
                ),
            ));
        }
        Ok(Allocation(percentages))
    }

    /// Build an allocation from a slice of exactly five percentages.
    pub fn from_slice(percentages: &[Percent]) -> CapAllocResult<Self> {
        let arr: [Percent; ASSET_COUNT] = percentages.try_into().map_err(|_| {
            CapAllocError::invalid(
                "allocation",
                format!(
                    "Expected {} percentages but got {}",
                    ASSET_COUNT,
                    percentages.len()
                ),
            )
        })?;
        Allocation::new(arr)
    }

    pub fn percentages(&self) -> [Percent; ASSET_COUNT] {
        self.0
    }

    pub fn percent(&self, asset: AssetClass) -> Percent {
        self.0[asset.index()]
    }

    /// Weights as fractions of one.
    pub fn weights(&self) -> [Decimal; ASSET_COUNT] {
        self.0
            .map(|p| Decimal::from(p) / Decimal::from(TOTAL_PERCENT))
    }
}

impl TryFrom<[Percent; ASSET_COUNT]> for Allocation {
    type Error = CapAllocError;

    fn try_from(value: [Percent; ASSET_COUNT]) -> Result<Self, Self::Error> {
        Allocation::new(value)
    }
}

impl From<Allocation> for [Percent; ASSET_COUNT] {
    fn from(value: Allocation) -> Self {
        value.0
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, asset) in AssetClass::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{} {}%", asset, self.0[i])?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Lazily enumerate every allocation on the `step` grid.
///
/// The sequence matches filtering the full 5-way cross-product of
/// `{0, step, 2*step, ..} <= 100` down to the tuples summing to 100, in
/// cross-product order (the last asset class varies fastest). Steps that do
/// not divide 100 produce an empty sequence.
pub fn generate(step: u32) -> CapAllocResult<Allocations> {
    validate_step(step)?;
    Ok(Allocations::new(step))
}

/// Exact number of allocations `generate(step)` yields, without enumerating.
///
/// Compositions of `100 / step` into five non-negative parts:
/// `C(100/step + 4, 4)` when `step` divides 100, otherwise zero.
pub fn allocation_count(step: u32) -> u64 {
    if step == 0 || TOTAL_PERCENT % step != 0 {
        return 0;
    }
    let n = u64::from(TOTAL_PERCENT / step);
    (n + 1) * (n + 2) * (n + 3) * (n + 4) / 24
}

/// Size of the raw candidate cross-product `(floor(100/step) + 1)^5`.
pub fn candidate_count(step: u32) -> u64 {
    if step == 0 {
        return 0;
    }
    let per_class = u64::from(TOTAL_PERCENT / step) + 1;
    per_class.pow(ASSET_COUNT as u32)
}

fn validate_step(step: u32) -> CapAllocResult<()> {
    if !(MIN_STEP..=MAX_STEP).contains(&step) {
        return Err(CapAllocError::invalid(
            "step",
            format!(
                "Step must be between {} and {} percentage points, got {}",
                MIN_STEP, MAX_STEP, step
            ),
        ));
    }
    Ok(())
}

/// Iterator over grid allocations.
///
/// The first four parts run as an odometer over candidate values, pruned
/// whenever their running sum passes 100. The fifth part is whatever remains,
/// kept only when it is itself a multiple of the step.
#[derive(Debug, Clone)]
pub struct Allocations {
    step: u32,
    prefix: [Percent; ASSET_COUNT - 1],
    exhausted: bool,
}

impl Allocations {
    fn new(step: u32) -> Self {
        Allocations {
            step,
            prefix: [0; ASSET_COUNT - 1],
            exhausted: false,
        }
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    fn advance(&mut self) {
        let mut pos = self.prefix.len() - 1;
        loop {
            self.prefix[pos] += self.step;
            let running: Percent = self.prefix[..=pos].iter().sum();
            if running <= TOTAL_PERCENT {
                return;
            }
            self.prefix[pos] = 0;
            if pos == 0 {
                self.exhausted = true;
                return;
            }
            pos -= 1;
        }
    }
}

impl Iterator for Allocations {
    type Item = Allocation;

    fn next(&mut self) -> Option<Allocation> {
        while !self.exhausted {
            let prefix = self.prefix;
            self.advance();

            let used: Percent = prefix.iter().sum();
            let rest = TOTAL_PERCENT - used;
            if rest % self.step == 0 {
                let mut parts = [0; ASSET_COUNT];
                parts[..ASSET_COUNT - 1].copy_from_slice(&prefix);
                parts[ASSET_COUNT - 1] = rest;
                return Some(Allocation(parts));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Straight cross-product + filter, used to check the pruned generator.
    fn brute_force(step: u32) -> Vec<Allocation> {
        let values: Vec<Percent> = (0..=TOTAL_PERCENT).step_by(step as usize).collect();
        let mut out = Vec::new();
        for &a in &values {
            for &b in &values {
                for &c in &values {
                    for &d in &values {
                        for &e in &values {
                            if a + b + c + d + e == TOTAL_PERCENT {
                                out.push(Allocation([a, b, c, d, e]));
                            }
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_step_50_yields_15() {
        let all: Vec<Allocation> = generate(50).unwrap().collect();
        assert_eq!(all.len(), 15);
        assert_eq!(all.first().unwrap().percentages(), [0, 0, 0, 0, 100]);
        assert_eq!(all.last().unwrap().percentages(), [100, 0, 0, 0, 0]);
    }

    #[test]
    fn test_matches_brute_force_order() {
        for step in [10, 20, 25, 33, 50, 100] {
            let fast: Vec<Allocation> = generate(step).unwrap().collect();
            assert_eq!(fast, brute_force(step), "step {}", step);
        }
    }

    #[test]
    fn test_non_divisor_step_is_empty() {
        assert_eq!(generate(3).unwrap().count(), 0);
        assert_eq!(generate(7).unwrap().count(), 0);
        assert_eq!(allocation_count(3), 0);
    }

    #[test]
    fn test_step_100_single_class() {
        let all: Vec<Allocation> = generate(100).unwrap().collect();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|a| a.percentages().contains(&100)));
    }

    #[test]
    fn test_counts() {
        assert_eq!(allocation_count(50), 15);
        assert_eq!(allocation_count(10), 1001);
        assert_eq!(allocation_count(5), 10626);
        assert_eq!(allocation_count(1), 4_598_126);
        assert_eq!(candidate_count(10), 161_051);
        assert_eq!(candidate_count(1), 10_510_100_501);
        assert_eq!(generate(10).unwrap().count() as u64, allocation_count(10));
    }

    #[test]
    fn test_step_out_of_range() {
        assert!(generate(0).is_err());
        assert!(generate(101).is_err());
    }

    #[test]
    fn test_allocation_new_rejects_bad_sum() {
        assert!(Allocation::new([50, 50, 0, 0, 0]).is_ok());
        assert!(Allocation::new([50, 40, 0, 0, 0]).is_err());
        assert!(Allocation::from_slice(&[100, 0, 0]).is_err());
    }

    #[test]
    fn test_weights_are_fractions() {
        let a = Allocation::new([60, 10, 0, 30, 0]).unwrap();
        assert_eq!(
            a.weights(),
            [dec!(0.6), dec!(0.1), dec!(0), dec!(0.3), dec!(0)]
        );
        assert_eq!(a.percent(AssetClass::Immobilier), 30);
    }

    #[test]
    fn test_serde_validates() {
        let a: Allocation = serde_json::from_str("[20,20,20,20,20]").unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), "[20,20,20,20,20]");
        assert!(serde_json::from_str::<Allocation>("[20,20,20,20,0]").is_err());
    }

    #[test]
    fn test_display() {
        let a = Allocation::new([60, 10, 0, 30, 0]).unwrap();
        assert_eq!(
            a.to_string(),
            "Taux 60% | Actions_cotees 10% | Actions_non_cotees 0% | Immobilier 30% | Cash 0%"
        );
    }
}
