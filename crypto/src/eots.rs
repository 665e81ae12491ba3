//! Extractable one-time signatures (EOTS).
//!
//! A Schnorr signature whose nonce `R = r·G` is published ahead of time
//! (through a Merkle commitment) instead of being sent with the signature.
//! The signature is only the scalar `s = r + e·x` where
//! `e = H(R ‖ P ‖ m)`.
//!
//! Signing two different messages with the same `r` reveals `x`:
//! `x = (s1 − s2) / (e1 − e2)`. [`extract_secret_key`] performs that
//! computation; callers must treat each secret randomness as single-use.

use crate::hash::hash_to_scalar;
use crate::keys::{canonical_scalar, decode_point, encode_point, random_scalar, secret_scalar};
use crate::CryptoError;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use pubrand_types::{EotsSignature, PubRand, PublicKey, SecRand, SecretKey};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

const CHALLENGE_TAG: &[u8] = b"pubrand/eots/challenge";

fn challenge(pub_rand: &[u8; 32], public_key: &[u8; 32], message: &[u8]) -> Scalar {
    hash_to_scalar(CHALLENGE_TAG, &[pub_rand, public_key, message])
}

fn randomness_scalar(sec_rand: &SecRand) -> Result<Scalar, CryptoError> {
    canonical_scalar(sec_rand.as_bytes()).ok_or(CryptoError::InvalidSecretRandomness(
        "not a canonical non-zero scalar",
    ))
}

/// Draw a fresh one-time randomness pair.
pub fn generate_randomness<R: RngCore + CryptoRng>(rng: &mut R) -> (SecRand, PubRand) {
    let mut r = random_scalar(rng);
    let pub_rand = PubRand::new(encode_point(&RistrettoPoint::mul_base(&r)));
    let sec_rand = SecRand::new(r.to_bytes());
    r.zeroize();
    (sec_rand, pub_rand)
}

/// Derive the public counterpart of a secret randomness value.
pub fn public_randomness(sec_rand: &SecRand) -> Result<PubRand, CryptoError> {
    let mut r = randomness_scalar(sec_rand)?;
    let pub_rand = PubRand::new(encode_point(&RistrettoPoint::mul_base(&r)));
    r.zeroize();
    Ok(pub_rand)
}

/// Sign `message` with the long-term key and one secret randomness value.
pub fn sign(
    secret_key: &SecretKey,
    sec_rand: &SecRand,
    message: &[u8],
) -> Result<EotsSignature, CryptoError> {
    let mut x = secret_scalar(secret_key)?;
    let mut r = randomness_scalar(sec_rand)?;
    let public_key = encode_point(&RistrettoPoint::mul_base(&x));
    let pub_rand = encode_point(&RistrettoPoint::mul_base(&r));

    let e = challenge(&pub_rand, &public_key, message);
    let s = r + e * x;

    x.zeroize();
    r.zeroize();
    Ok(EotsSignature::new(s.to_bytes()))
}

/// Verify a one-time signature against the committed public randomness.
///
/// Returns `true` if `s·G == R + e·P`, `false` otherwise (including for
/// malformed keys, randomness, or non-canonical `s`).
pub fn verify(
    public_key: &PublicKey,
    pub_rand: &PubRand,
    message: &[u8],
    signature: &EotsSignature,
) -> bool {
    let (Ok(p), Ok(r)) = (
        decode_point(public_key.as_bytes()),
        decode_point(pub_rand.as_bytes()),
    ) else {
        return false;
    };
    let Some(s) = Option::<Scalar>::from(Scalar::from_canonical_bytes(*signature.as_bytes()))
    else {
        return false;
    };
    let e = challenge(pub_rand.as_bytes(), public_key.as_bytes(), message);
    RistrettoPoint::mul_base(&s) == r + e * p
}

/// Recover the long-term secret key from two signatures that reused the
/// same public randomness on different messages.
///
/// Both signatures must verify; the recovered key is checked against
/// `public_key` before being returned.
pub fn extract_secret_key(
    public_key: &PublicKey,
    pub_rand: &PubRand,
    message1: &[u8],
    signature1: &EotsSignature,
    message2: &[u8],
    signature2: &EotsSignature,
) -> Result<SecretKey, CryptoError> {
    if message1 == message2 {
        return Err(CryptoError::SameMessage);
    }
    if !verify(public_key, pub_rand, message1, signature1)
        || !verify(public_key, pub_rand, message2, signature2)
    {
        return Err(CryptoError::ExtractionFailed("signature does not verify"));
    }

    let s1 = Scalar::from_bytes_mod_order(*signature1.as_bytes());
    let s2 = Scalar::from_bytes_mod_order(*signature2.as_bytes());
    let e1 = challenge(pub_rand.as_bytes(), public_key.as_bytes(), message1);
    let e2 = challenge(pub_rand.as_bytes(), public_key.as_bytes(), message2);
    let de = e1 - e2;
    if de == Scalar::ZERO {
        return Err(CryptoError::ExtractionFailed("challenges collide"));
    }

    let mut x = (s1 - s2) * de.invert();
    let recovered = SecretKey::new(x.to_bytes());
    x.zeroize();

    if crate::keys::public_from_secret(&recovered)? != *public_key {
        return Err(CryptoError::ExtractionFailed("recovered key does not match"));
    }
    Ok(recovered)
}
