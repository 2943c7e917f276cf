use thiserror::Error;

use crate::mask::MAX_GENOMES;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("at least 2 genomes are required, got {got}")]
    TooFewGenomes { got: usize },

    #[error("at most {max} genomes are supported, got {got}", max = MAX_GENOMES)]
    TooManyGenomes { got: usize },

    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
