//! Long-term key generation and scalar/point decoding.

use crate::hash::hash_to_scalar;
use crate::CryptoError;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use pubrand_types::{KeyPair, PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

const SEED_TAG: &[u8] = b"pubrand/keys/seed";

/// Draw a uniformly random non-zero scalar.
pub(crate) fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    let mut wide = [0u8; 64];
    loop {
        rng.fill_bytes(&mut wide);
        let scalar = Scalar::from_bytes_mod_order_wide(&wide);
        if scalar != Scalar::ZERO {
            wide.zeroize();
            return scalar;
        }
    }
}

/// Interpret 32 bytes as a canonical, non-zero scalar.
pub(crate) fn canonical_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::<Scalar>::from(Scalar::from_canonical_bytes(*bytes)).filter(|s| *s != Scalar::ZERO)
}

pub(crate) fn secret_scalar(secret: &SecretKey) -> Result<Scalar, CryptoError> {
    canonical_scalar(secret.as_bytes())
        .ok_or(CryptoError::InvalidSecretKey("not a canonical non-zero scalar"))
}

/// Decompress a 32-byte encoding into a group element.
pub(crate) fn decode_point(bytes: &[u8; 32]) -> Result<RistrettoPoint, CryptoError> {
    CompressedRistretto(*bytes)
        .decompress()
        .ok_or(CryptoError::InvalidPoint("not a valid ristretto encoding"))
}

pub(crate) fn encode_point(point: &RistrettoPoint) -> [u8; 32] {
    point.compress().to_bytes()
}

fn keypair_from_scalar(mut x: Scalar) -> KeyPair {
    let public = PublicKey::new(encode_point(&RistrettoPoint::mul_base(&x)));
    let secret = SecretKey::new(x.to_bytes());
    x.zeroize();
    KeyPair { public, secret }
}

/// Generate a new key pair from the operating system's secure random source.
pub fn generate_keypair() -> KeyPair {
    keypair_from_rng(&mut OsRng)
}

/// Generate a new key pair from a caller-supplied RNG (seedable in tests).
pub fn keypair_from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    keypair_from_scalar(random_scalar(rng))
}

/// Derive a key pair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let mut x = hash_to_scalar(SEED_TAG, &[seed]);
    if x == Scalar::ZERO {
        x = Scalar::ONE;
    }
    keypair_from_scalar(x)
}

/// Derive the public key from a secret key.
pub fn public_from_secret(secret: &SecretKey) -> Result<PublicKey, CryptoError> {
    let mut x = secret_scalar(secret)?;
    let public = PublicKey::new(encode_point(&RistrettoPoint::mul_base(&x)));
    x.zeroize();
    Ok(public)
}

/// Reconstruct a full key pair from a secret key.
pub fn keypair_from_secret(secret: SecretKey) -> Result<KeyPair, CryptoError> {
    let public = public_from_secret(&secret)?;
    Ok(KeyPair { public, secret })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generate_produces_valid_keypair() {
        let kp = generate_keypair();
        assert_ne!(kp.public.as_bytes(), &[0u8; 32]);
        assert_eq!(public_from_secret(&kp.secret).unwrap(), kp.public);
    }

    #[test]
    fn seeded_rng_is_deterministic() {
        let a = keypair_from_rng(&mut StdRng::seed_from_u64(7));
        let b = keypair_from_rng(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.public, b.public);
        assert_eq!(a.secret.as_bytes(), b.secret.as_bytes());
    }

    #[test]
    fn keypair_from_seed_deterministic() {
        let kp1 = keypair_from_seed(&[42u8; 32]);
        let kp2 = keypair_from_seed(&[42u8; 32]);
        assert_eq!(kp1.public, kp2.public);
        assert_ne!(kp1.public, keypair_from_seed(&[43u8; 32]).public);
    }

    #[test]
    fn keypair_from_secret_roundtrip() {
        let kp1 = generate_keypair();
        let kp2 = keypair_from_secret(SecretKey::new(*kp1.secret.as_bytes())).unwrap();
        assert_eq!(kp1.public, kp2.public);
    }

    #[test]
    fn zero_secret_key_rejected() {
        let err = public_from_secret(&SecretKey::new([0u8; 32])).unwrap_err();
        assert!(matches!(err, CryptoError::InvalidSecretKey(_)));
    }

    #[test]
    fn non_canonical_secret_key_rejected() {
        assert!(public_from_secret(&SecretKey::new([0xFF; 32])).is_err());
    }

    #[test]
    fn invalid_point_rejected() {
        assert!(decode_point(&[0xFF; 32]).is_err());
    }
}
