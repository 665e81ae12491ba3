use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(&'static str),

    #[error("invalid secret randomness: {0}")]
    InvalidSecretRandomness(&'static str),

    #[error("invalid group element: {0}")]
    InvalidPoint(&'static str),

    #[error("signatures are over the same message, nothing to extract")]
    SameMessage,

    #[error("key extraction failed: {0}")]
    ExtractionFailed(&'static str),

    #[error("invalid inclusion proof: {0}")]
    InvalidProof(String),

    #[error("nonce derivation failed")]
    NonceDerivation,
}
