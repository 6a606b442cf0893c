use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use capalloc_core::allocation::{Allocation, AssetClass};
use capalloc_core::screening::score;
use capalloc_core::Percent;

use super::{load_assumptions, portfolio_detail};

/// Arguments for scoring a single allocation
#[derive(Args)]
pub struct ScoreArgs {
    /// Five whole percentages summing to 100, in order
    /// Taux,Actions_cotees,Actions_non_cotees,Immobilier,Cash
    #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
    pub weights: Vec<Percent>,

    /// Capital to allocate (also the ROE equity base)
    #[arg(long, default_value = "100000000")]
    pub capital: Decimal,

    /// Tax rate on income (0 to 1)
    #[arg(long, default_value = "0.30")]
    pub tax_rate: Decimal,

    /// JSON or YAML file with market assumptions
    #[arg(long)]
    pub assumptions: Option<String>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let allocation = Allocation::from_slice(&args.weights)?;
    let assumptions = load_assumptions(&args.assumptions)?;
    let portfolio = score(&allocation, &assumptions, args.capital, args.tax_rate)?;

    let mut result = portfolio_detail(&portfolio);
    let invested: Vec<Value> = AssetClass::ALL
        .iter()
        .filter(|a| allocation.percent(**a) > 0)
        .map(|a| Value::from(a.name()))
        .collect();
    result.insert("invested_in".into(), Value::Array(invested));
    Ok(Value::Object(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn args(weights: Vec<Percent>) -> ScoreArgs {
        ScoreArgs {
            weights,
            capital: dec!(100000000),
            tax_rate: dec!(0.30),
            assumptions: None,
        }
    }

    #[test]
    fn test_scores_allocation() {
        let v = run_score(args(vec![60, 10, 0, 30, 0])).unwrap();
        assert_eq!(v["roe"], "0.03085");
        assert_eq!(v["guaranteed_yield"], "0.012");
        assert_eq!(
            v["invested_in"],
            serde_json::json!(["Taux", "Actions_cotees", "Immobilier"])
        );
    }

    #[test]
    fn test_rejects_bad_sum() {
        let err = run_score(args(vec![50, 10, 0, 30, 0])).unwrap_err();
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_unbounded_capital_is_error() {
        let mut a = args(vec![0, 100, 0, 0, 0]);
        a.capital = Decimal::MAX;
        a.tax_rate = dec!(0);
        let err = run_score(a).unwrap_err();
        assert!(err.to_string().contains("capital"));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(run_score(args(vec![50, 50])).is_err());
    }
}
