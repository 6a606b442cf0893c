use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use capalloc_core::screening::{
    run_screening, sort_by_roe_desc, Recommendation, ScreeningInput, ScreeningLimits,
    ScreeningOutput, ScreeningParameters,
};
use capalloc_core::ComputationOutput;

use super::{load_assumptions, portfolio_detail, portfolio_row, rate};
use crate::input;

/// Which slice of the screening result to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScreenView {
    /// Recommendation and counts
    Summary,
    /// Admissible portfolios, highest ROE first
    Admissible,
    /// Every scored portfolio, in grid order
    All,
}

/// Arguments for a screening run
#[derive(Args)]
pub struct ScreenArgs {
    /// JSON or YAML file with a full screening input (`-` reads JSON from stdin).
    /// Overrides the parameter flags below.
    #[arg(long)]
    pub input: Option<String>,

    /// Capital to allocate (also the ROE equity base)
    #[arg(long, default_value = "100000000")]
    pub capital: Decimal,

    /// Tax rate on income (0 to 1)
    #[arg(long, default_value = "0.30")]
    pub tax_rate: Decimal,

    /// Minimum shareholder ROE (0 to 0.20)
    #[arg(long, default_value = "0.10")]
    pub roe_threshold: Decimal,

    /// Minimum guaranteed policyholder yield (0 to 0.10)
    #[arg(long, default_value = "0.033")]
    pub yield_threshold: Decimal,

    /// Grid step in percentage points (1 to 20)
    #[arg(long, default_value = "10")]
    pub step: u32,

    /// Refuse grids with more allocations than this
    #[arg(long)]
    pub max_allocations: Option<u64>,

    /// JSON or YAML file with market assumptions
    #[arg(long)]
    pub assumptions: Option<String>,

    /// Slice of the result to print
    #[arg(long, value_enum, default_value = "summary")]
    pub view: ScreenView,
}

pub fn run_screen(args: ScreenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let screening_input = build_input(&args)?;
    let output = run_screening(&screening_input)?;
    Ok(render(&output, args.view))
}

fn build_input(args: &ScreenArgs) -> Result<ScreeningInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::load(path);
    }

    let mut limits = ScreeningLimits::default();
    if let Some(max) = args.max_allocations {
        limits.max_allocations = max;
    }
    let assumptions = match args.assumptions {
        Some(_) => Some(load_assumptions(&args.assumptions)?),
        None => None,
    };

    Ok(ScreeningInput {
        parameters: ScreeningParameters {
            capital: args.capital,
            tax_rate: args.tax_rate,
            roe_threshold: args.roe_threshold,
            yield_threshold: args.yield_threshold,
            step: args.step,
        },
        assumptions,
        limits,
    })
}

fn render(output: &ComputationOutput<ScreeningOutput>, view: ScreenView) -> Value {
    match view {
        ScreenView::Summary => summary(output),
        ScreenView::Admissible => Value::Array(
            sort_by_roe_desc(&output.result.admissible)
                .iter()
                .map(portfolio_row)
                .collect(),
        ),
        ScreenView::All => Value::Array(output.result.portfolios.iter().map(portfolio_row).collect()),
    }
}

/// Envelope with a flat result: recommendation first, then counts and ranges.
fn summary(output: &ComputationOutput<ScreeningOutput>) -> Value {
    let res = &output.result;
    let mut result = Map::new();

    match res.recommendation {
        Recommendation::Recommended { ref portfolio } => {
            result.insert("status".into(), Value::from("recommended"));
            result.insert(
                "recommendation".into(),
                Value::String(portfolio.allocation.to_string()),
            );
            result.extend(portfolio_detail(portfolio));
        }
        Recommendation::NoneAdmissible => {
            result.insert("status".into(), Value::from("none_admissible"));
            result.insert(
                "recommendation".into(),
                Value::from("no admissible portfolio"),
            );
        }
    }

    let s = &res.summary;
    result.insert("allocations_scored".into(), Value::from(s.allocations_scored));
    result.insert("admissible_count".into(), Value::from(s.admissible_count));
    let ranges = [
        ("min_roe", s.min_roe),
        ("max_roe", s.max_roe),
        ("min_risk", s.min_risk),
        ("max_risk", s.max_risk),
    ];
    for (key, v) in ranges {
        result.insert(key.into(), v.map(rate).unwrap_or(Value::Null));
    }
    if let Some(ref top) = s.max_roe_admissible {
        result.insert(
            "max_roe_admissible".into(),
            Value::String(top.allocation.to_string()),
        );
    }

    let mut envelope = Map::new();
    envelope.insert("result".into(), Value::Object(result));
    envelope.insert("methodology".into(), Value::from(output.methodology.clone()));
    envelope.insert("assumptions".into(), output.assumptions.clone());
    envelope.insert(
        "warnings".into(),
        Value::Array(output.warnings.iter().cloned().map(Value::from).collect()),
    );
    envelope.insert(
        "metadata".into(),
        serde_json::to_value(&output.metadata).unwrap_or_default(),
    );
    Value::Object(envelope)
}
