pub mod asset_class;
pub mod generator;

pub use asset_class::{AssetClass, ASSET_COUNT};
pub use generator::{allocation_count, candidate_count, generate, Allocation, Allocations};
