use pubrand_messages::MessageError;
use pubrand_randomness::RandomnessError;
use pubrand_types::Height;
use std::fmt;
use thiserror::Error;

/// Failures reported by a channel implementation. Treated as transient by
/// the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("submission failed: {0}")]
    Submission(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Why one confirmation attempt did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// The ledger has nothing for this request yet.
    NotFound,
    StartHeight { expected: Height, actual: Height },
    Count { expected: u64, actual: u64 },
    Commitment { expected: String, actual: String },
    /// Votes exist for the block but not from the expected signer.
    VoterMissing { voter: String, voters: usize },
    /// The response had the wrong shape for the request.
    UnexpectedResponse(String),
    Query(ChannelError),
}

impl Discrepancy {
    /// Data was present but differed from what was sent.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self,
            Self::StartHeight { .. }
                | Self::Count { .. }
                | Self::Commitment { .. }
                | Self::VoterMissing { .. }
        )
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::StartHeight { expected, actual } => {
                write!(f, "start height mismatch: expected {expected}, got {actual}")
            }
            Self::Count { expected, actual } => {
                write!(f, "count mismatch: expected {expected}, got {actual}")
            }
            Self::Commitment { expected, actual } => {
                write!(f, "commitment mismatch: expected {expected}, got {actual}")
            }
            Self::VoterMissing { voter, voters } => {
                write!(f, "signer {voter} missing from {voters} voters")
            }
            Self::UnexpectedResponse(what) => write!(f, "unexpected response: {what}"),
            Self::Query(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("verification failed after {attempts} attempts: {last}")]
    VerificationFailed { attempts: u32, last: Discrepancy },

    #[error("cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("payload: {0}")]
    Payload(#[from] RandomnessError),

    #[error("message: {0}")]
    Message(#[from] MessageError),

    #[error("config error: {0}")]
    Config(String),
}
