use clap::Args;
use serde_json::{json, Value};

use capalloc_core::allocation::{allocation_count, candidate_count, generate};
use capalloc_core::screening::pipeline::DEFAULT_MAX_ALLOCATIONS;
use capalloc_core::CapAllocError;

use super::allocation_columns;

/// Arguments for listing the allocation grid
#[derive(Args)]
pub struct GridArgs {
    /// Grid step in percentage points (1 to 100)
    #[arg(long, default_value = "10")]
    pub step: u32,

    /// Only report how many allocations and raw candidates the step gives
    #[arg(long)]
    pub count_only: bool,
}

pub fn run_grid(args: GridArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let allocations = allocation_count(args.step);
    let candidates = candidate_count(args.step);

    if args.count_only {
        // Validates the step even though nothing is enumerated.
        generate(args.step)?;
        return Ok(json!({
            "step": args.step,
            "allocations": allocations,
            "candidates": candidates,
        }));
    }

    if allocations > DEFAULT_MAX_ALLOCATIONS {
        return Err(CapAllocError::ComputationTooLarge {
            step: args.step,
            allocations,
            candidates,
            limit: DEFAULT_MAX_ALLOCATIONS,
        }
        .into());
    }

    let rows: Vec<Value> = generate(args.step)?
        .map(|a| Value::Object(allocation_columns(&a)))
        .collect();
    Ok(Value::Array(rows))
}
