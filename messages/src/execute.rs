use crate::{CommitmentRecord, MessageError};
use pubrand_crypto::{eots, InclusionProof};
use pubrand_randomness::{
    finality_message, RandomnessBatch, RandomnessError, Reveal, SerializedProof, SignerContext,
};
use pubrand_types::{
    BlockHash, Commitment, EotsSignature, Height, ParseError, PubRand, PublicKey,
    SchnorrSignature,
};
use serde::{Deserialize, Serialize};

/// State-changing requests to the ledger. Submitting is not idempotent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    CommitPublicRandomness(CommitmentPayload),
    SubmitFinalitySignature(RevealPayload),
}

/// Bytes the commitment signature covers: start height and count as
/// big-endian u64, then the 32-byte commitment.
pub fn commitment_message(start_height: Height, count: u64, commitment: &Commitment) -> Vec<u8> {
    let mut msg = Vec::with_capacity(16 + Commitment::LEN);
    msg.extend_from_slice(&start_height.to_be_bytes());
    msg.extend_from_slice(&count.to_be_bytes());
    msg.extend_from_slice(commitment.as_bytes());
    msg
}

fn parse_hash(s: &str) -> Result<[u8; 32], ParseError> {
    let bytes = hex::decode(s).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ParseError::WrongLength {
            expected: 32,
            actual: bytes.len(),
        })
}

/// Registers a batch commitment under a signer identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentPayload {
    pub signer_public_key_hex: String,
    pub start_height: Height,
    pub count: u64,
    pub commitment: String,
    pub signature: String,
}

impl CommitmentPayload {
    /// Sign `batch`'s commitment with the long-term key.
    pub fn new(signer: &SignerContext, batch: &RandomnessBatch) -> Result<Self, RandomnessError> {
        let message = commitment_message(batch.start_height(), batch.count(), batch.commitment());
        let signature = signer.sign_message(&message)?;
        Ok(Self {
            signer_public_key_hex: signer.public_key_hex(),
            start_height: batch.start_height(),
            count: batch.count(),
            commitment: batch.commitment().to_hex(),
            signature: signature.to_hex(),
        })
    }

    pub fn signer(&self) -> Result<PublicKey, MessageError> {
        PublicKey::from_hex(&self.signer_public_key_hex)
            .map_err(MessageError::field("signerPublicKeyHex"))
    }

    pub fn commitment(&self) -> Result<Commitment, MessageError> {
        Commitment::from_hex(&self.commitment).map_err(MessageError::field("commitment"))
    }

    /// What the ledger will report back once this payload is accepted.
    pub fn record(&self) -> CommitmentRecord {
        CommitmentRecord {
            start_height: self.start_height,
            count: self.count,
            commitment: self.commitment.clone(),
        }
    }

    pub fn verify_signature(&self) -> Result<(), MessageError> {
        let signer = self.signer()?;
        let commitment = self.commitment()?;
        let signature = SchnorrSignature::from_hex(&self.signature)
            .map_err(MessageError::field("signature"))?;
        let message = commitment_message(self.start_height, self.count, &commitment);
        if !pubrand_crypto::verify_signature(&message, &signature, &signer) {
            return Err(MessageError::InvalidCommitmentSignature);
        }
        Ok(())
    }
}

/// Discloses one committed randomness value with a finality signature on
/// `(height, blockHash)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealPayload {
    pub signer_public_key_hex: String,
    pub height: Height,
    pub public_randomness: String,
    pub proof: SerializedProof,
    pub block_hash: String,
    pub signature: String,
}

impl RevealPayload {
    /// Package a reveal produced for `block_hash`.
    pub fn new(signer: &PublicKey, reveal: &Reveal, block_hash: &BlockHash) -> Self {
        Self {
            signer_public_key_hex: signer.to_hex(),
            height: reveal.height,
            public_randomness: reveal.public_randomness.to_hex(),
            proof: SerializedProof::from(&reveal.proof),
            block_hash: block_hash.to_hex(),
            signature: reveal.signature.to_hex(),
        }
    }

    pub fn signer(&self) -> Result<PublicKey, MessageError> {
        PublicKey::from_hex(&self.signer_public_key_hex)
            .map_err(MessageError::field("signerPublicKeyHex"))
    }

    pub fn block_hash(&self) -> Result<BlockHash, MessageError> {
        BlockHash::from_hex(&self.block_hash).map_err(MessageError::field("blockHash"))
    }

    fn inclusion_proof(&self) -> Result<InclusionProof, MessageError> {
        let leaf_hash = parse_hash(&self.proof.leaf_hash)
            .map_err(MessageError::field("proof.leafHash"))?;
        let aunts = self
            .proof
            .sibling_hashes
            .iter()
            .map(|h| parse_hash(h).map_err(MessageError::field("proof.siblingHashes")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InclusionProof {
            total: self.proof.total,
            index: self.proof.index,
            leaf_hash,
            aunts,
        })
    }

    /// Check the reveal against the signer's registered commitment: height
    /// inside the committed range, proof at the matching index, and a valid
    /// signature over `height ‖ blockHash`.
    pub fn verify(&self, record: &CommitmentRecord) -> Result<(), MessageError> {
        if !record.covers(self.height) {
            return Err(MessageError::HeightOutOfRange {
                height: self.height,
                start_height: record.start_height,
                count: record.count,
            });
        }
        let expected_index = self.height - record.start_height;
        if self.proof.index != expected_index {
            return Err(MessageError::ProofIndexMismatch {
                expected: expected_index,
                actual: self.proof.index,
            });
        }
        if self.proof.total != record.count {
            return Err(MessageError::ProofTotalMismatch {
                expected: record.count,
                actual: self.proof.total,
            });
        }

        let signer = self.signer()?;
        let block_hash = self.block_hash()?;
        let commitment = record.commitment()?;
        let pub_rand = PubRand::from_hex(&self.public_randomness)
            .map_err(MessageError::field("publicRandomness"))?;
        let signature =
            EotsSignature::from_hex(&self.signature).map_err(MessageError::field("signature"))?;

        self.inclusion_proof()?
            .verify(commitment.as_bytes(), pub_rand.as_bytes())?;

        let message = finality_message(self.height, &block_hash);
        if !eots::verify(&signer, &pub_rand, &message, &signature) {
            return Err(MessageError::InvalidFinalitySignature {
                height: self.height,
            });
        }
        Ok(())
    }
}
