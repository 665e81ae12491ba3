//! Single-use tracking of revealed batch indices.

use crate::{RandomnessBatch, RandomnessError};
use pubrand_crypto::sha256;
use pubrand_types::{Commitment, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Revealed indices, isolated per (signer, batch commitment).
///
/// Each index keeps the SHA-256 of the message it signed. Signing is
/// deterministic, so the same message at the same index yields the same
/// signature and may be produced again; any other message is refused.
/// Holds no secret material and serializes to JSON, so a caller that runs
/// each step in a separate process can persist it between invocations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedIndices {
    batches: BTreeMap<String, BTreeMap<u64, String>>,
}

/// Result of a successful [`ConsumedIndices::claim`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Claim {
    /// First reveal at this index.
    Fresh,
    /// The index was already revealed for this exact message.
    Repeat,
}

fn batch_key(signer: &PublicKey, commitment: &Commitment) -> String {
    format!("{signer}:{commitment}")
}

fn message_digest(message: &[u8]) -> String {
    hex::encode(sha256(message))
}

impl ConsumedIndices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, signer: &PublicKey, commitment: &Commitment, index: u64) -> bool {
        self.batches
            .get(&batch_key(signer, commitment))
            .is_some_and(|set| set.contains_key(&index))
    }

    /// Whether revealing `index` for `message` would be refused.
    pub fn conflicts(
        &self,
        signer: &PublicKey,
        commitment: &Commitment,
        index: u64,
        message: &[u8],
    ) -> bool {
        self.batches
            .get(&batch_key(signer, commitment))
            .and_then(|set| set.get(&index))
            .is_some_and(|digest| *digest != message_digest(message))
    }

    /// Mark `index` as revealed for `message`; fails if it was revealed for
    /// a different message.
    pub fn claim(
        &mut self,
        signer: &PublicKey,
        commitment: &Commitment,
        index: u64,
        message: &[u8],
    ) -> Result<Claim, RandomnessError> {
        let digest = message_digest(message);
        let set = self.batches.entry(batch_key(signer, commitment)).or_default();
        match set.get(&index) {
            None => {
                set.insert(index, digest);
                Ok(Claim::Fresh)
            }
            Some(existing) if *existing == digest => Ok(Claim::Repeat),
            Some(_) => {
                tracing::warn!(index, %commitment, "refused to reuse one-time randomness");
                Err(RandomnessError::IndexAlreadyRevealed {
                    index,
                    commitment: *commitment,
                })
            }
        }
    }

    /// Number of revealed indices for one batch.
    pub fn consumed_count(&self, signer: &PublicKey, commitment: &Commitment) -> usize {
        self.batches
            .get(&batch_key(signer, commitment))
            .map_or(0, BTreeMap::len)
    }

    /// Whether every index of `batch` has been revealed.
    pub fn is_exhausted(&self, signer: &PublicKey, batch: &RandomnessBatch) -> bool {
        self.consumed_count(signer, batch.commitment()) as u64 == batch.count()
    }
}
