//! Identifiers of the external blocks being voted on.

use crate::macros::fixed_bytes;
use serde::{Deserialize, Serialize};

/// Height of an external block. Heights start at 1.
pub type Height = u64;

/// A 32-byte block identifier (app hash) chosen by the application.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHash([u8; 32]);

fixed_bytes!(BlockHash, 32);

impl Default for BlockHash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl BlockHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}
