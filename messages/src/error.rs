use pubrand_crypto::CryptoError;
use pubrand_types::{Height, ParseError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("field {field}: {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("commitment signature does not verify")]
    InvalidCommitmentSignature,

    #[error("height {height} not covered by commitment starting at {start_height} with {count} entries")]
    HeightOutOfRange {
        height: Height,
        start_height: Height,
        count: u64,
    },

    #[error("proof is for index {actual}, height requires {expected}")]
    ProofIndexMismatch { expected: u64, actual: u64 },

    #[error("proof total {actual} does not match commitment count {expected}")]
    ProofTotalMismatch { expected: u64, actual: u64 },

    #[error("inclusion proof rejected: {0}")]
    InvalidProof(#[from] CryptoError),

    #[error("finality signature for height {height} does not verify")]
    InvalidFinalitySignature { height: Height },
}

impl MessageError {
    pub(crate) fn field(field: &'static str) -> impl FnOnce(ParseError) -> Self {
        move |source| Self::InvalidField { field, source }
    }
}
