//! Batch generation.

use crate::proofs::ProofStore;
use crate::RandomnessError;
use pubrand_crypto::{eots, merkle, MerkleTree};
use pubrand_types::{Commitment, Height, PubRand, SecRand};
use rand::{CryptoRng, RngCore};
use std::fmt;

/// A batch of one-time randomness pairs bound by one Merkle commitment.
///
/// Index `i` belongs to height `start_height + i`. Immutable once built;
/// single-use of each index is tracked outside the batch (see
/// [`crate::ConsumedIndices`]).
#[derive(Clone, PartialEq, Eq)]
pub struct RandomnessBatch {
    start_height: Height,
    secret_randomness: Vec<SecRand>,
    public_randomness: Vec<PubRand>,
    commitment: Commitment,
    proofs: ProofStore,
}

impl RandomnessBatch {
    /// Draw `count` fresh randomness pairs for heights starting at
    /// `start_height` and commit to them.
    ///
    /// Deterministic for a fixed RNG state, so tests pass a seeded RNG.
    pub fn generate<R: RngCore + CryptoRng>(
        start_height: Height,
        count: u64,
        rng: &mut R,
    ) -> Result<Self, RandomnessError> {
        if count == 0 {
            return Err(RandomnessError::InvalidParameter(
                "count must be greater than zero".into(),
            ));
        }
        if start_height == 0 {
            return Err(RandomnessError::InvalidParameter(
                "start height must be at least 1".into(),
            ));
        }
        if start_height.checked_add(count - 1).is_none() {
            return Err(RandomnessError::InvalidParameter(format!(
                "heights overflow: start {start_height} with {count} entries"
            )));
        }
        let len = usize::try_from(count).map_err(|_| {
            RandomnessError::InvalidParameter(format!("count {count} exceeds addressable memory"))
        })?;

        let (secret_randomness, public_randomness): (Vec<SecRand>, Vec<PubRand>) =
            (0..len).map(|_| eots::generate_randomness(&mut *rng)).unzip();

        let (root, proofs) = MerkleTree::from_leaves(&public_randomness).into_parts();
        let batch = Self {
            start_height,
            secret_randomness,
            public_randomness,
            commitment: Commitment::new(root),
            proofs: ProofStore::new(proofs),
        };

        tracing::info!(
            start_height,
            count,
            commitment = %batch.commitment,
            "generated randomness batch"
        );
        Ok(batch)
    }

    /// Assemble a batch from parts the caller has already validated.
    pub(crate) fn from_validated_parts(
        start_height: Height,
        secret_randomness: Vec<SecRand>,
        public_randomness: Vec<PubRand>,
        commitment: Commitment,
        proofs: ProofStore,
    ) -> Self {
        Self {
            start_height,
            secret_randomness,
            public_randomness,
            commitment,
            proofs,
        }
    }

    pub fn start_height(&self) -> Height {
        self.start_height
    }

    pub fn count(&self) -> u64 {
        self.public_randomness.len() as u64
    }

    /// Last height this batch covers.
    pub fn end_height(&self) -> Height {
        self.start_height + (self.count() - 1)
    }

    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn public_randomness(&self) -> &[PubRand] {
        &self.public_randomness
    }

    pub fn proofs(&self) -> &ProofStore {
        &self.proofs
    }

    pub(crate) fn secret_randomness(&self) -> &[SecRand] {
        &self.secret_randomness
    }

    pub(crate) fn check_index(&self, index: u64) -> Result<usize, RandomnessError> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.public_randomness.len())
            .ok_or(RandomnessError::IndexOutOfRange {
                index,
                count: self.count(),
            })
    }

    /// Height that index `index` is reserved for.
    pub fn height_of(&self, index: u64) -> Result<Height, RandomnessError> {
        self.check_index(index)?;
        Ok(self.start_height + index)
    }

    /// Index reserved for `height`.
    pub fn index_of(&self, height: Height) -> Result<u64, RandomnessError> {
        if height < self.start_height || height > self.end_height() {
            return Err(RandomnessError::HeightOutOfRange {
                height,
                start_height: self.start_height,
                count: self.count(),
            });
        }
        Ok(height - self.start_height)
    }

    /// Rebuild the Merkle root from the public randomness.
    pub fn recompute_commitment(&self) -> Commitment {
        Commitment::new(merkle::root_from_leaves(&self.public_randomness))
    }

    /// Check every stored proof against the commitment.
    pub fn verify_proofs(&self) -> Result<(), RandomnessError> {
        self.proofs
            .verify_all(&self.public_randomness, &self.commitment)
    }
}

impl fmt::Debug for RandomnessBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomnessBatch")
            .field("start_height", &self.start_height)
            .field("count", &self.count())
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}
