use puf_core::PufError;

/// Errors from basis generation, parity evaluation, fitting and prediction.
#[derive(Debug, thiserror::Error)]
pub enum LmnError {
    #[error("input length must be positive")]
    ZeroInputLength,

    #[error("degree {deg} is outside [0, {n}]")]
    InvalidDegree { n: usize, deg: usize },

    #[error(
        "parity basis for n={n}, deg={deg} has {size} entries, above the limit of {limit}; \
         lower the degree or raise the limit"
    )]
    BasisTooLarge {
        n: usize,
        deg: usize,
        size: u128,
        limit: usize,
    },

    #[error("shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Puf(#[from] PufError),
}

impl From<LmnError> for PufError {
    fn from(e: LmnError) -> Self {
        match e {
            LmnError::Puf(inner) => inner,
            other => PufError::Simulation(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LmnError>;
