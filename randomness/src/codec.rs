//! Lossless hex/JSON transport of a [`RandomnessBatch`].
//!
//! A batch is produced in one step and consumed in a later, separate one, and
//! is too large for a command line. The JSON object is a stable wire format:
//!
//! ```json
//! {
//!   "startHeight": 1,
//!   "secretRandomnessHex": ["…"],
//!   "publicRandomnessHex": ["…"],
//!   "commitmentHex": "…",
//!   "proofs": [{ "total": 4, "index": 0, "leafHash": "…", "siblingHashes": ["…"] }]
//! }
//! ```
//!
//! Decoding re-derives everything it can and refuses any batch that would
//! not have come out of [`RandomnessBatch::generate`].

use crate::error::{FieldRef, MalformedInput};
use crate::{ProofStore, RandomnessBatch, RandomnessError};
use pubrand_crypto::merkle::{self, MAX_AUNTS};
use pubrand_crypto::{eots, InclusionProof};
use pubrand_types::{Commitment, Height, PubRand, SecRand};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Transport form of an inclusion proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedProof {
    pub total: u64,
    pub index: u64,
    pub leaf_hash: String,
    pub sibling_hashes: Vec<String>,
}

impl From<&InclusionProof> for SerializedProof {
    fn from(proof: &InclusionProof) -> Self {
        Self {
            total: proof.total,
            index: proof.index,
            leaf_hash: hex::encode(proof.leaf_hash),
            sibling_hashes: proof.aunts.iter().map(hex::encode).collect(),
        }
    }
}

/// Transport form of a batch. Contains secret randomness in hex and is wiped
/// on drop; `Debug` only reports the shape.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SerializedBatch {
    pub start_height: Height,
    pub secret_randomness_hex: Vec<String>,
    pub public_randomness_hex: Vec<String>,
    pub commitment_hex: String,
    pub proofs: Vec<SerializedProof>,
}

impl std::fmt::Debug for SerializedBatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializedBatch")
            .field("start_height", &self.start_height)
            .field("entries", &self.public_randomness_hex.len())
            .field("commitment_hex", &self.commitment_hex)
            .finish_non_exhaustive()
    }
}

impl SerializedBatch {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, MalformedInput> {
        serde_json::from_str(json).map_err(|e| MalformedInput::Json(e.to_string()))
    }
}

pub fn encode(batch: &RandomnessBatch) -> SerializedBatch {
    SerializedBatch {
        start_height: batch.start_height(),
        secret_randomness_hex: batch
            .secret_randomness()
            .iter()
            .map(SecRand::expose_hex)
            .collect(),
        public_randomness_hex: batch.public_randomness().iter().map(PubRand::to_hex).collect(),
        commitment_hex: batch.commitment().to_hex(),
        proofs: batch.proofs().iter().map(SerializedProof::from).collect(),
    }
}

fn decode_fixed(s: &str, at: FieldRef) -> Result<[u8; 32], MalformedInput> {
    let bytes = Zeroizing::new(hex::decode(s).map_err(|_| MalformedInput::InvalidHex { at })?);
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| MalformedInput::WrongLength {
            at,
            expected: 32,
            actual: bytes.len(),
        })
}

fn decode_proof(
    position: usize,
    proof: &SerializedProof,
    count: usize,
) -> Result<InclusionProof, MalformedInput> {
    if proof.index != position as u64 {
        return Err(MalformedInput::ProofIndexMismatch {
            position,
            index: proof.index,
        });
    }
    if proof.total != count as u64 {
        return Err(MalformedInput::ProofTotalMismatch {
            position,
            total: proof.total,
            count,
        });
    }
    if proof.sibling_hashes.len() > MAX_AUNTS {
        return Err(MalformedInput::TooManySiblings {
            position,
            count: proof.sibling_hashes.len(),
        });
    }
    let leaf_hash = decode_fixed(&proof.leaf_hash, FieldRef::LeafHash(position))?;
    let aunts = proof
        .sibling_hashes
        .iter()
        .enumerate()
        .map(|(sibling, h)| {
            decode_fixed(
                h,
                FieldRef::SiblingHash {
                    proof: position,
                    sibling,
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(InclusionProof {
        total: proof.total,
        index: proof.index,
        leaf_hash,
        aunts,
    })
}

/// Rebuild a batch, checking that every part agrees with every other.
pub fn decode(serialized: &SerializedBatch) -> Result<RandomnessBatch, RandomnessError> {
    Ok(decode_checked(serialized)?)
}

fn decode_checked(s: &SerializedBatch) -> Result<RandomnessBatch, MalformedInput> {
    let (secret, public, proofs) = (
        s.secret_randomness_hex.len(),
        s.public_randomness_hex.len(),
        s.proofs.len(),
    );
    if secret == 0 && public == 0 && proofs == 0 {
        return Err(MalformedInput::EmptyBatch);
    }
    if secret != public || public != proofs {
        return Err(MalformedInput::LengthMismatch {
            secret,
            public,
            proofs,
        });
    }
    let count = public;
    if s.start_height == 0 {
        return Err(MalformedInput::InvalidStartHeight);
    }
    if s.start_height.checked_add(count as u64 - 1).is_none() {
        return Err(MalformedInput::HeightOverflow {
            start_height: s.start_height,
            count: count as u64,
        });
    }

    let mut secret_randomness = Vec::with_capacity(count);
    let mut public_randomness = Vec::with_capacity(count);
    for index in 0..count {
        let sec_rand = SecRand::new(decode_fixed(
            &s.secret_randomness_hex[index],
            FieldRef::SecretRandomness(index),
        )?);
        let pub_rand = PubRand::new(decode_fixed(
            &s.public_randomness_hex[index],
            FieldRef::PublicRandomness(index),
        )?);
        let derived = eots::public_randomness(&sec_rand)
            .map_err(|_| MalformedInput::NonCanonicalSecret { index })?;
        if derived != pub_rand {
            return Err(MalformedInput::RandomnessPairMismatch { index });
        }
        secret_randomness.push(sec_rand);
        public_randomness.push(pub_rand);
    }

    let commitment = Commitment::new(decode_fixed(&s.commitment_hex, FieldRef::Commitment)?);
    if merkle::root_from_leaves(&public_randomness) != *commitment.as_bytes() {
        return Err(MalformedInput::CommitmentMismatch);
    }

    let proofs = s
        .proofs
        .iter()
        .enumerate()
        .map(|(position, p)| {
            let proof = decode_proof(position, p, count)?;
            proof
                .verify(commitment.as_bytes(), public_randomness[position].as_bytes())
                .map_err(|_| MalformedInput::ProofRejected { position })?;
            Ok(proof)
        })
        .collect::<Result<Vec<_>, MalformedInput>>()?;

    Ok(RandomnessBatch::from_validated_parts(
        s.start_height,
        secret_randomness,
        public_randomness,
        commitment,
        ProofStore::new(proofs),
    ))
}

/// Decode straight from the JSON transport form.
pub fn from_json(json: &str) -> Result<RandomnessBatch, RandomnessError> {
    decode(&SerializedBatch::from_json(json)?)
}

pub fn to_json(batch: &RandomnessBatch) -> Result<String, serde_json::Error> {
    encode(batch).to_json()
}
