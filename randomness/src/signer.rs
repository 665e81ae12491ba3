//! Explicit signer context.
//!
//! Holds one signer's long-term key pair for the duration of a calling
//! context. Every operation that needs the key takes a `&SignerContext`;
//! nothing in this workspace keeps keys in ambient state.

use crate::RandomnessError;
use pubrand_crypto::CryptoError;
use pubrand_types::{KeyPair, PublicKey, SchnorrSignature, SecretKey};
use rand::{CryptoRng, RngCore};
use std::fmt;

pub struct SignerContext {
    keypair: KeyPair,
}

impl SignerContext {
    /// Wrap a secret key, validating it and deriving the public key.
    pub fn new(secret: SecretKey) -> Result<Self, RandomnessError> {
        let keypair = pubrand_crypto::keypair_from_secret(secret).map_err(invalid_key)?;
        Ok(Self { keypair })
    }

    /// Parse a hex-encoded 32-byte secret key.
    pub fn from_hex(secret_hex: &str) -> Result<Self, RandomnessError> {
        let secret = SecretKey::from_hex(secret_hex)
            .map_err(|e| RandomnessError::InvalidParameter(format!("secret key: {e}")))?;
        Self::new(secret)
    }

    /// Generate a fresh signer from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            keypair: pubrand_crypto::generate_keypair(),
        }
    }

    /// Generate a signer from a caller-supplied RNG.
    pub fn from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            keypair: pubrand_crypto::keypair_from_rng(rng),
        }
    }

    /// Deterministic signer for tests and fixtures.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            keypair: pubrand_crypto::keypair_from_seed(seed),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keypair.public
    }

    /// The signer identity as it appears in payloads and voter sets.
    pub fn public_key_hex(&self) -> String {
        self.keypair.public.to_hex()
    }

    /// Schnorr-sign a reusable message (e.g. a commitment) with the long-term key.
    pub fn sign_message(&self, message: &[u8]) -> Result<SchnorrSignature, RandomnessError> {
        pubrand_crypto::sign_message(message, &self.keypair.secret)
            .map_err(RandomnessError::SigningFailure)
    }

    /// Hex encoding of the secret key, for handing a fresh key to its owner.
    pub fn expose_secret_hex(&self) -> String {
        self.keypair.secret.expose_hex()
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.keypair.secret
    }
}

impl fmt::Debug for SignerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerContext")
            .field("public_key", &self.keypair.public)
            .finish_non_exhaustive()
    }
}

fn invalid_key(e: CryptoError) -> RandomnessError {
    RandomnessError::InvalidParameter(format!("secret key: {e}"))
}
