//! Reveal construction.
//!
//! [`reveal`] is stateless: it signs whatever index it is given. Callers
//! that sign more than once per batch should go through
//! [`crate::FinalitySigner`], which refuses to reuse an index.

use crate::{RandomnessBatch, RandomnessError, SignerContext};
use pubrand_crypto::{eots, InclusionProof};
use pubrand_types::{BlockHash, Commitment, EotsSignature, Height, PubRand, PublicKey};

/// One disclosed batch entry plus the signature it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reveal {
    pub height: Height,
    pub index: u64,
    pub message: Vec<u8>,
    pub public_randomness: PubRand,
    pub proof: InclusionProof,
    pub signature: EotsSignature,
}

/// The message a finality vote signs: big-endian height ‖ block hash.
pub fn finality_message(height: Height, block_hash: &BlockHash) -> Vec<u8> {
    let mut msg = Vec::with_capacity(8 + BlockHash::LEN);
    msg.extend_from_slice(&height.to_be_bytes());
    msg.extend_from_slice(block_hash.as_bytes());
    msg
}

/// Sign `message` with the randomness at `index` and package the reveal.
///
/// Consumes the one-time randomness at `index`: signing a second, different
/// message at the same index leaks the signer's key.
pub fn reveal(
    batch: &RandomnessBatch,
    index: u64,
    signer: &SignerContext,
    message: &[u8],
) -> Result<Reveal, RandomnessError> {
    let i = batch.check_index(index)?;
    let height = batch.height_of(index)?;
    let proof = batch
        .proofs()
        .get(index)
        .cloned()
        .ok_or(RandomnessError::IndexOutOfRange {
            index,
            count: batch.count(),
        })?;

    let signature = eots::sign(signer.secret_key(), &batch.secret_randomness()[i], message)
        .map_err(RandomnessError::SigningFailure)?;

    tracing::debug!(height, index, "produced finality signature");
    Ok(Reveal {
        height,
        index,
        message: message.to_vec(),
        public_randomness: batch.public_randomness()[i],
        proof,
        signature,
    })
}

/// Receiver-side check: the randomness is committed at the reveal's index and
/// the signature verifies under `signer`.
pub fn verify_reveal(
    reveal: &Reveal,
    signer: &PublicKey,
    commitment: &Commitment,
) -> Result<(), RandomnessError> {
    if reveal.proof.index != reveal.index {
        return Err(RandomnessError::InvalidProof {
            index: reveal.index,
            source: pubrand_crypto::CryptoError::InvalidProof(format!(
                "proof is for index {}",
                reveal.proof.index
            )),
        });
    }
    reveal
        .proof
        .verify(commitment.as_bytes(), reveal.public_randomness.as_bytes())
        .map_err(|source| RandomnessError::InvalidProof {
            index: reveal.index,
            source,
        })?;
    if !eots::verify(
        signer,
        &reveal.public_randomness,
        &reveal.message,
        &reveal.signature,
    ) {
        return Err(RandomnessError::InvalidSignature {
            height: reveal.height,
        });
    }
    Ok(())
}
