//! Per-index inclusion proofs of one batch.

use crate::RandomnessError;
use pubrand_crypto::InclusionProof;
use pubrand_types::{Commitment, PubRand};

/// The inclusion proof for every index of a batch, in index order.
///
/// Revealing index `i` discloses `proofs[i]` only; the other entries stay
/// hidden behind the commitment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofStore {
    proofs: Vec<InclusionProof>,
}

impl ProofStore {
    pub fn new(proofs: Vec<InclusionProof>) -> Self {
        Self { proofs }
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<&InclusionProof> {
        usize::try_from(index).ok().and_then(|i| self.proofs.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &InclusionProof> {
        self.proofs.iter()
    }

    /// Check that `leaf` is committed at `index` under `commitment`.
    pub fn verify(
        &self,
        index: u64,
        leaf: &PubRand,
        commitment: &Commitment,
    ) -> Result<(), RandomnessError> {
        let proof = self.get(index).ok_or(RandomnessError::IndexOutOfRange {
            index,
            count: self.proofs.len() as u64,
        })?;
        if proof.index != index {
            return Err(RandomnessError::InvalidProof {
                index,
                source: pubrand_crypto::CryptoError::InvalidProof(format!(
                    "stored under {index} but proves index {}",
                    proof.index
                )),
            });
        }
        proof
            .verify(commitment.as_bytes(), leaf.as_bytes())
            .map_err(|source| RandomnessError::InvalidProof { index, source })
    }

    /// Check every proof against the corresponding leaf.
    pub fn verify_all(
        &self,
        leaves: &[PubRand],
        commitment: &Commitment,
    ) -> Result<(), RandomnessError> {
        if leaves.len() != self.proofs.len() {
            return Err(RandomnessError::InvalidParameter(format!(
                "{} leaves for {} proofs",
                leaves.len(),
                self.proofs.len()
            )));
        }
        for (i, leaf) in leaves.iter().enumerate() {
            self.verify(i as u64, leaf, commitment)?;
        }
        Ok(())
    }
}
