use super::scoring::ScoredPortfolio;
use crate::types::Rate;

/// Portfolios meeting both thresholds, in their original order.
pub fn filter_admissible(
    results: &[ScoredPortfolio],
    roe_threshold: Rate,
    yield_threshold: Rate,
) -> Vec<ScoredPortfolio> {
    results
        .iter()
        .filter(|p| p.is_admissible(roe_threshold, yield_threshold))
        .cloned()
        .collect()
}

/// Minimum-risk portfolio. On equal risk the earliest one wins.
pub fn recommend(admissible: &[ScoredPortfolio]) -> Option<&ScoredPortfolio> {
    admissible.iter().min_by(|a, b| a.risk.cmp(&b.risk))
}

/// Copy sorted by ROE, highest first. Equal ROE keeps the input order.
pub fn sort_by_roe_desc(portfolios: &[ScoredPortfolio]) -> Vec<ScoredPortfolio> {
    let mut sorted = portfolios.to_vec();
    sorted.sort_by(|a, b| b.roe.cmp(&a.roe));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{generate, Allocation};
    use crate::market::MarketAssumptions;
    use crate::screening::scoring::PortfolioScorer;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn scored_grid(step: u32) -> Vec<ScoredPortfolio> {
        let scorer =
            PortfolioScorer::new(&MarketAssumptions::default(), dec!(100000000), dec!(0.30))
                .unwrap();
        generate(step).unwrap().map(|a| scorer.score(&a)).collect()
    }

    #[test]
    fn test_filter_partitions_result_set() {
        let all = scored_grid(10);
        let (roe_t, y_t) = (dec!(0.03), dec!(0.01));
        let admissible = filter_admissible(&all, roe_t, y_t);
        assert_eq!(admissible.len(), 55);
        for p in &admissible {
            assert!(p.roe >= roe_t && p.guaranteed_yield >= y_t);
        }
        let rejected = all.iter().filter(|p| !admissible.contains(p));
        for p in rejected {
            assert!(p.roe < roe_t || p.guaranteed_yield < y_t);
        }
    }

    #[test]
    fn test_filter_keeps_order() {
        let all = scored_grid(25);
        let admissible = filter_admissible(&all, dec!(0.02), dec!(0.005));
        let positions: Vec<usize> = admissible
            .iter()
            .map(|p| all.iter().position(|q| q == p).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_recommend_min_risk() {
        let all = scored_grid(10);
        let admissible = filter_admissible(&all, dec!(0.03), dec!(0.01));
        let best = recommend(&admissible).unwrap();
        assert_eq!(best.allocation.percentages(), [60, 10, 0, 30, 0]);
        assert!(admissible.iter().all(|p| best.risk <= p.risk));
    }

    #[test]
    fn test_recommend_empty() {
        assert!(recommend(&[]).is_none());
    }

    #[test]
    fn test_recommend_tie_takes_first() {
        let make = |p: [u32; 5], risk: Decimal| ScoredPortfolio {
            allocation: Allocation::new(p).unwrap(),
            weights: Allocation::new(p).unwrap().weights(),
            roe: dec!(0.05),
            risk,
            guaranteed_yield: dec!(0.01),
            gross_income: Decimal::ZERO,
            net_income: Decimal::ZERO,
            capital_gain: Decimal::ZERO,
        };
        let candidates = vec![
            make([0, 0, 0, 0, 100], dec!(0.02)),
            make([0, 0, 0, 100, 0], dec!(0.01)),
            make([100, 0, 0, 0, 0], dec!(0.01)),
        ];
        let best = recommend(&candidates).unwrap();
        assert_eq!(best.allocation.percentages(), [0, 0, 0, 100, 0]);
    }

    #[test]
    fn test_sort_by_roe_desc() {
        let all = scored_grid(50);
        let sorted = sort_by_roe_desc(&all);
        assert_eq!(sorted.len(), all.len());
        assert!(sorted.windows(2).all(|w| w[0].roe >= w[1].roe));
        assert_eq!(sorted[0].allocation.percentages(), [0, 0, 100, 0, 0]);
    }
}
