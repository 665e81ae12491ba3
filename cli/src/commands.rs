//! Crypto-only operations behind each subcommand.
//!
//! Every command returns a serializable output; `main` prints it as one JSON
//! line on stdout. Nothing here talks to a ledger.

use anyhow::Context;
use pubrand_messages::{CommitmentPayload, ExecuteMsg, RevealPayload};
use pubrand_randomness::{
    codec, ConsumedIndices, FinalitySigner, RandomnessBatch, SerializedBatch, SignerContext,
};
use pubrand_types::{BlockHash, Height};
use rand::rngs::{OsRng, StdRng};
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct KeypairOutput {
    pub public_key: String,
    pub private_key: String,
}

#[derive(Debug, Serialize)]
pub struct CommitmentOutput {
    /// Serialized batch, to be fed back to `generate-finality-sig`.
    pub rand_list_info: SerializedBatch,
    pub contract_message: ExecuteMsg,
}

#[derive(Debug, Serialize)]
pub struct FinalitySigOutput {
    pub contract_message: ExecuteMsg,
}

pub fn generate_keypair(seed: Option<u64>) -> KeypairOutput {
    let signer = match seed {
        Some(seed) => SignerContext::from_rng(&mut StdRng::seed_from_u64(seed)),
        None => SignerContext::generate(),
    };
    KeypairOutput {
        public_key: signer.public_key_hex(),
        private_key: signer.expose_secret_hex(),
    }
}

/// Draw a batch for `[start_height, start_height + count)` and sign its
/// commitment.
pub fn generate_commitment(
    signer: &SignerContext,
    start_height: Height,
    count: u64,
    seed: Option<u64>,
) -> anyhow::Result<CommitmentOutput> {
    let batch = match seed {
        Some(seed) => {
            RandomnessBatch::generate(start_height, count, &mut StdRng::seed_from_u64(seed))?
        }
        None => RandomnessBatch::generate(start_height, count, &mut OsRng)?,
    };
    let payload = CommitmentPayload::new(signer, &batch)?;
    Ok(CommitmentOutput {
        rand_list_info: codec::encode(&batch),
        contract_message: ExecuteMsg::CommitPublicRandomness(payload),
    })
}

/// Accepts either the bare serialized batch or the full
/// `generate-pub-rand-commitment` output.
fn parse_batch(input: &str) -> anyhow::Result<RandomnessBatch> {
    let value: serde_json::Value = serde_json::from_str(input).context("batch input is not JSON")?;
    let batch_value = value.get("rand_list_info").cloned().unwrap_or(value);
    let serialized: SerializedBatch =
        serde_json::from_value(batch_value).context("batch input has the wrong shape")?;
    Ok(codec::decode(&serialized)?)
}

fn load_consumed(path: &Path) -> anyhow::Result<ConsumedIndices> {
    if !path.exists() {
        return Ok(ConsumedIndices::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading consumed-index ledger {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing consumed-index ledger {}", path.display()))
}

/// Write through a sibling temp file so a crash never leaves a truncated
/// ledger behind.
fn store_consumed(path: &Path, consumed: &ConsumedIndices) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec_pretty(consumed)?)
        .with_context(|| format!("writing {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

/// Sign `block_hash` at `height` using the batch entry reserved for it.
///
/// With a consumed-index ledger, the index is recorded before the signature
/// is returned and an index that was already revealed is refused.
pub fn generate_finality_sig(
    signer: SignerContext,
    batch_input: &str,
    height: Height,
    block_hash_hex: &str,
    consumed_ledger: Option<&Path>,
) -> anyhow::Result<FinalitySigOutput> {
    let block_hash = BlockHash::from_hex(block_hash_hex).context("invalid block hash")?;
    let batch = parse_batch(batch_input)?;

    let consumed = match consumed_ledger {
        Some(path) => load_consumed(path)?,
        None => {
            tracing::warn!(
                height,
                "no consumed-index ledger configured; reuse across runs goes undetected"
            );
            ConsumedIndices::new()
        }
    };
    let mut finality = FinalitySigner::with_consumed(signer, consumed);
    let reveal = finality.sign_block(&batch, height, &block_hash)?;
    if let Some(path) = consumed_ledger {
        store_consumed(path, finality.consumed())?;
    }

    let payload = RevealPayload::new(finality.signer().public_key(), &reveal, &block_hash);
    Ok(FinalitySigOutput {
        contract_message: ExecuteMsg::SubmitFinalitySignature(payload),
    })
}
