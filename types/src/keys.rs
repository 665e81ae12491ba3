//! Long-term key and signature types.

use crate::macros::fixed_bytes;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 32-byte compressed Ristretto public key identifying a signer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey([u8; 32]);

fixed_bytes!(PublicKey, 32);

/// A 32-byte long-term secret key (canonical scalar encoding).
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn from_hex(s: &str) -> Result<Self, crate::ParseError> {
        let mut bytes = hex::decode(s.trim())
            .map_err(|e| crate::ParseError::InvalidHex(e.to_string()))?;
        let result = <[u8; 32]>::try_from(bytes.as_slice())
            .map(Self)
            .map_err(|_| crate::ParseError::WrongLength {
                expected: 32,
                actual: bytes.len(),
            });
        bytes.zeroize();
        result
    }

    /// Hex encoding, for handing a freshly generated key to its owner.
    pub fn expose_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// A long-term key pair (public + secret).
///
/// Use `pubrand_crypto::generate_keypair()` or
/// `pubrand_crypto::keypair_from_secret()` to construct key pairs.
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

/// A 64-byte Schnorr signature (`R ‖ s`) by the long-term key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SchnorrSignature([u8; 64]);

fixed_bytes!(SchnorrSignature, 64);

/// A 32-byte extractable one-time signature: the scalar `s` only, the
/// nonce point being the committed public randomness.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EotsSignature([u8; 32]);

fixed_bytes!(EotsSignature, 32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_display_is_full_hex() {
        let pk = PublicKey::new([0x11; 32]);
        assert_eq!(pk.to_string(), "11".repeat(32));
        assert_eq!(format!("{pk:?}"), "PublicKey(11111111\u{2026})");
    }

    #[test]
    fn secret_key_from_hex() {
        let sk = SecretKey::from_hex(&"02".repeat(32)).unwrap();
        assert_eq!(sk.as_bytes(), &[2u8; 32]);
    }

    #[test]
    fn secret_key_rejects_wrong_length() {
        assert!(matches!(
            SecretKey::from_hex("0202"),
            Err(crate::ParseError::WrongLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn secret_key_rejects_bad_hex() {
        assert!(matches!(
            SecretKey::from_hex("zz"),
            Err(crate::ParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn schnorr_signature_is_64_bytes() {
        let sig = SchnorrSignature::from_slice(&[9u8; 64]).unwrap();
        assert_eq!(sig.as_bytes().len(), 64);
        assert!(SchnorrSignature::from_slice(&[9u8; 32]).is_err());
    }
}
