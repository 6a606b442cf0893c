pub mod allocation;
pub mod error;
pub mod market;
pub mod screening;
pub mod types;

mod math;

pub use error::CapAllocError;
pub use types::*;

/// Standard result type for all capital allocation operations
pub type CapAllocResult<T> = Result<T, CapAllocError>;
