pub mod filter;
pub mod pipeline;
pub mod scoring;

pub use filter::{filter_admissible, recommend, sort_by_roe_desc};
pub use pipeline::{
    run_screening, screen, Recommendation, ScreeningInput, ScreeningLimits, ScreeningOutput,
    ScreeningParameters, ScreeningSummary,
};
pub use scoring::{score, PortfolioScorer, ScoredPortfolio, MAX_CAPITAL};
