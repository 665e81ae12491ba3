//! Schnorr signatures by the long-term key.
//!
//! Used for messages that are not one-time, such as the commitment payload.
//! The nonce is derived deterministically as `HMAC-SHA512(x, tag ‖ m)`, so a
//! signature never depends on the quality of a runtime RNG.

use crate::hash::hash_to_scalar;
use crate::keys::{decode_point, encode_point, secret_scalar};
use crate::CryptoError;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use hmac::{Hmac, Mac};
use pubrand_types::{PublicKey, SchnorrSignature, SecretKey};
use sha2::Sha512;
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

const NONCE_TAG: &[u8] = b"pubrand/schnorr/nonce";
const CHALLENGE_TAG: &[u8] = b"pubrand/schnorr/challenge";

fn derive_nonce(secret_key: &SecretKey, message: &[u8]) -> Result<Scalar, CryptoError> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(secret_key.as_bytes())
        .map_err(|_| CryptoError::NonceDerivation)?;
    mac.update(NONCE_TAG);
    mac.update(message);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&mac.finalize().into_bytes());
    let k = Scalar::from_bytes_mod_order_wide(&wide);
    wide.zeroize();
    if k == Scalar::ZERO {
        return Err(CryptoError::NonceDerivation);
    }
    Ok(k)
}

/// Sign a message with a secret key, returning `R ‖ s`.
pub fn sign_message(
    message: &[u8],
    secret_key: &SecretKey,
) -> Result<SchnorrSignature, CryptoError> {
    let mut x = secret_scalar(secret_key)?;
    let mut k = derive_nonce(secret_key, message)?;
    let public_key = encode_point(&RistrettoPoint::mul_base(&x));
    let nonce_point = encode_point(&RistrettoPoint::mul_base(&k));

    let e = hash_to_scalar(CHALLENGE_TAG, &[&nonce_point, &public_key, message]);
    let s = k + e * x;
    x.zeroize();
    k.zeroize();

    let mut out = [0u8; 64];
    out[..32].copy_from_slice(&nonce_point);
    out[32..].copy_from_slice(&s.to_bytes());
    Ok(SchnorrSignature::new(out))
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
/// Rejects non-canonical `s` (malleability protection).
pub fn verify_signature(
    message: &[u8],
    signature: &SchnorrSignature,
    public_key: &PublicKey,
) -> bool {
    let sig = signature.as_bytes();
    let mut nonce_bytes = [0u8; 32];
    nonce_bytes.copy_from_slice(&sig[..32]);
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&sig[32..]);

    let (Ok(nonce_point), Ok(p)) = (decode_point(&nonce_bytes), decode_point(public_key.as_bytes()))
    else {
        return false;
    };
    let Some(s) = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes)) else {
        return false;
    };
    let e = hash_to_scalar(CHALLENGE_TAG, &[&nonce_bytes, public_key.as_bytes(), message]);
    RistrettoPoint::mul_base(&s) == nonce_point + e * p
}
