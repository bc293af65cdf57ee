/// Errors raised while validating challenge-response data or querying simulations.
#[derive(Debug, thiserror::Error)]
pub enum PufError {
    #[error("challenge {row} has value {value} at position {col}; only +1 and -1 are accepted")]
    NotPlusMinusOne { row: usize, col: usize, value: i8 },

    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("simulation failed: {0}")]
    Simulation(String),
}

pub type Result<T> = std::result::Result<T, PufError>;
