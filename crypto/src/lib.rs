//! Cryptographic primitives for committed one-time randomness.
//!
//! - **Ristretto255** (via `curve25519-dalek`) as the prime-order group
//! - **EOTS**: extractable one-time Schnorr signatures over committed nonces
//! - **Schnorr** signatures by the long-term key (commitment payloads)
//! - **SHA-256** Merkle trees with inclusion proofs (RFC 6962 hashing)

pub mod eots;
pub mod error;
pub mod hash;
pub mod keys;
pub mod merkle;
pub mod schnorr;

pub use error::CryptoError;
pub use hash::{hash_to_scalar, sha256, sha256_multi};
pub use keys::{
    generate_keypair, keypair_from_rng, keypair_from_secret, keypair_from_seed,
    public_from_secret,
};
pub use merkle::{InclusionProof, MerkleTree};
pub use schnorr::{sign_message, verify_signature};
