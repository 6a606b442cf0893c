pub mod assumptions;

pub use assumptions::{AssetAssumption, MarketAssumptions, MAX_VOLATILITY, MAX_YIELD};
