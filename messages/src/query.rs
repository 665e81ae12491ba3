use crate::MessageError;
use pubrand_types::{Commitment, Height};
use serde::{Deserialize, Serialize};

/// Read-only requests to the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// Most recent commitment registered by a signer.
    #[serde(rename_all = "camelCase")]
    LastPubRandCommit { signer_public_key_hex: String },
    /// Signers whose finality signature for this block was accepted.
    #[serde(rename_all = "camelCase")]
    BlockVoters { height: Height, block_hash: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryResponse {
    /// `None` when the signer has not committed yet.
    LastCommitment(Option<CommitmentRecord>),
    Voters(Vec<String>),
}

/// A commitment as the ledger stores it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentRecord {
    pub start_height: Height,
    pub count: u64,
    pub commitment: String,
}

impl CommitmentRecord {
    pub fn new(start_height: Height, count: u64, commitment: &Commitment) -> Self {
        Self {
            start_height,
            count,
            commitment: commitment.to_hex(),
        }
    }

    pub fn commitment(&self) -> Result<Commitment, MessageError> {
        Commitment::from_hex(&self.commitment).map_err(MessageError::field("commitment"))
    }

    /// Whether `height` falls inside the committed range.
    pub fn covers(&self, height: Height) -> bool {
        height >= self.start_height && height - self.start_height < self.count
    }
}
