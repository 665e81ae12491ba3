//! One-time randomness pairs.

use crate::macros::fixed_bytes;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public half of a one-time randomness pair: a compressed group element.
///
/// Safe to publish once its index is revealed; before that it is only
/// disclosed through the batch commitment.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PubRand([u8; 32]);

fixed_bytes!(PubRand, 32);

/// Secret half of a one-time randomness pair: a canonical scalar encoding.
///
/// Signing two different messages with the same value leaks the signer's
/// long-term key. Does not implement `Serialize` or `Display`; bytes are
/// zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecRand([u8; 32]);

impl SecRand {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding for the batch transport format only.
    pub fn expose_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for SecRand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecRand(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_randomness_debug_is_redacted() {
        let sr = SecRand::new([7u8; 32]);
        let printed = format!("{sr:?}");
        assert!(!printed.contains("0707"));
        assert!(printed.contains("redacted"));
    }

    #[test]
    fn pub_rand_hex_roundtrip() {
        let pr = PubRand::new([0xABu8; 32]);
        let parsed = PubRand::from_hex(&pr.to_hex()).unwrap();
        assert_eq!(pr, parsed);
    }

    #[test]
    fn pub_rand_rejects_short_input() {
        let err = PubRand::from_slice(&[1u8; 31]).unwrap_err();
        assert_eq!(
            err,
            crate::ParseError::WrongLength {
                expected: 32,
                actual: 31
            }
        );
    }
}
