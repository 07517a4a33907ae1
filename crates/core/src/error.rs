use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum StaffingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error(
        "bulk write stopped after {committed} committed operation(s): {source}"
    )]
    PartialCommit {
        committed: usize,
        #[source]
        source: StoreError,
    },
}

impl StaffingError {
    /// True when the failure means the record store could not be reached at all.
    pub fn is_store_unavailable(&self) -> bool {
        match self {
            StaffingError::Store(e) | StaffingError::PartialCommit { source: e, .. } => {
                e.is_unavailable()
            }
            _ => false,
        }
    }

    /// Operations already durable when a bulk write failed part way through.
    pub fn committed_before_failure(&self) -> usize {
        match self {
            StaffingError::PartialCommit { committed, .. } => *committed,
            _ => 0,
        }
    }
}

pub type StaffingResult<T> = std::result::Result<T, StaffingError>;
