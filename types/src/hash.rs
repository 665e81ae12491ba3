//! Merkle commitment digest.

use crate::macros::fixed_bytes;
use serde::{Deserialize, Serialize};

/// Root of the Merkle tree built over a batch of public randomness.
///
/// A pure function of the public randomness sequence, in index order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commitment([u8; 32]);

fixed_bytes!(Commitment, 32);
