use pubrand_crypto::CryptoError;
use pubrand_types::{Commitment, Height};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RandomnessError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("index {index} out of range for batch of {count}")]
    IndexOutOfRange { index: u64, count: u64 },

    #[error("height {height} not covered by batch starting at {start_height} with {count} entries")]
    HeightOutOfRange {
        height: Height,
        start_height: Height,
        count: u64,
    },

    #[error("index {index} of batch {commitment} was already revealed")]
    IndexAlreadyRevealed { index: u64, commitment: Commitment },

    #[error("signing failed: {0}")]
    SigningFailure(#[source] CryptoError),

    #[error("inclusion proof for index {index} rejected: {source}")]
    InvalidProof {
        index: u64,
        #[source]
        source: CryptoError,
    },

    #[error("finality signature for height {height} does not verify")]
    InvalidSignature { height: Height },

    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),
}

/// Location of a value inside a serialized batch, for decode diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    SecretRandomness(usize),
    PublicRandomness(usize),
    Commitment,
    LeafHash(usize),
    SiblingHash { proof: usize, sibling: usize },
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretRandomness(i) => write!(f, "secretRandomnessHex[{i}]"),
            Self::PublicRandomness(i) => write!(f, "publicRandomnessHex[{i}]"),
            Self::Commitment => f.write_str("commitmentHex"),
            Self::LeafHash(i) => write!(f, "proofs[{i}].leafHash"),
            Self::SiblingHash { proof, sibling } => {
                write!(f, "proofs[{proof}].siblingHashes[{sibling}]")
            }
        }
    }
}

/// Why a serialized batch was rejected. Each reason is distinct so callers
/// can tell corruption of one sequence from another.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid hex at {at}")]
    InvalidHex { at: FieldRef },

    #[error("wrong length at {at}: expected {expected} bytes, got {actual}")]
    WrongLength {
        at: FieldRef,
        expected: usize,
        actual: usize,
    },

    #[error("batch has no entries")]
    EmptyBatch,

    #[error("list lengths disagree: {secret} secret, {public} public, {proofs} proofs")]
    LengthMismatch {
        secret: usize,
        public: usize,
        proofs: usize,
    },

    #[error("start height must be at least 1")]
    InvalidStartHeight,

    #[error("heights overflow: start {start_height} with {count} entries")]
    HeightOverflow { start_height: Height, count: u64 },

    #[error("secret randomness {index} is not a canonical non-zero scalar")]
    NonCanonicalSecret { index: usize },

    #[error("public randomness {index} does not match its secret")]
    RandomnessPairMismatch { index: usize },

    #[error("proof at position {position} claims index {index}")]
    ProofIndexMismatch { position: usize, index: u64 },

    #[error("proof at position {position} claims total {total}, batch has {count}")]
    ProofTotalMismatch {
        position: usize,
        total: u64,
        count: usize,
    },

    #[error("proof at position {position} has {count} sibling hashes")]
    TooManySiblings { position: usize, count: usize },

    #[error("commitment does not match the public randomness")]
    CommitmentMismatch,

    #[error("proof at position {position} does not verify against the commitment")]
    ProofRejected { position: usize },
}
