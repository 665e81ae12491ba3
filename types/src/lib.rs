//! Fundamental types for committed one-time randomness.
//!
//! This crate defines the byte-level values shared across every other crate
//! in the workspace: long-term keys, one-time randomness pairs, signatures,
//! Merkle commitments and block identifiers. None of these types perform
//! any cryptography; `pubrand-crypto` interprets the bytes.

pub mod block;
pub mod error;
pub mod hash;
pub mod keys;
pub mod randomness;

mod macros;

pub use block::{BlockHash, Height};
pub use error::ParseError;
pub use hash::Commitment;
pub use keys::{EotsSignature, KeyPair, PublicKey, SchnorrSignature, SecretKey};
pub use randomness::{PubRand, SecRand};
