use thiserror::Error;

#[derive(Debug, Error)]
pub enum CapAllocError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error(
        "Computation too large: step {step} yields {allocations} allocations \
         ({candidates} raw candidates), limit is {limit}; use a larger step"
    )]
    ComputationTooLarge {
        step: u32,
        allocations: u64,
        candidates: u64,
        limit: u64,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CapAllocError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CapAllocError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CapAllocError {
    fn from(e: serde_json::Error) -> Self {
        CapAllocError::SerializationError(e.to_string())
    }
}
