//! Committed one-time randomness.
//!
//! A signer draws a batch of one-time randomness pairs, publishes a single
//! Merkle commitment over the public halves, and later reveals one entry per
//! external height together with an extractable one-time signature over that
//! height's block.
//!
//! - [`batch`]: batch generation ([`RandomnessBatch::generate`])
//! - [`proofs`]: per-index inclusion proofs ([`ProofStore`])
//! - [`reveal`]: stateless reveal construction and verification
//! - [`consumed`] / [`finality`]: single-use enforcement per batch index
//! - [`codec`]: lossless hex/JSON transport of a batch

pub mod batch;
pub mod codec;
pub mod consumed;
pub mod error;
pub mod finality;
pub mod proofs;
pub mod reveal;
pub mod signer;

pub use batch::RandomnessBatch;
pub use codec::{SerializedBatch, SerializedProof};
pub use consumed::{Claim, ConsumedIndices};
pub use error::{FieldRef, MalformedInput, RandomnessError};
pub use finality::FinalitySigner;
pub use proofs::ProofStore;
pub use reveal::{finality_message, reveal, verify_reveal, Reveal};
pub use signer::SignerContext;
