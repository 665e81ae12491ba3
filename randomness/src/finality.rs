//! Finality signing with single-use enforcement.

use crate::reveal::{finality_message, reveal};
use crate::{Claim, ConsumedIndices, RandomnessBatch, RandomnessError, Reveal, SignerContext};
use pubrand_types::{BlockHash, Height};

/// Signs reveals for one signer identity, refusing to use any batch index
/// for two different messages.
///
/// An index is recorded only after its signature was produced, so a failed
/// signing attempt can be retried. Asking again for the same index and
/// message returns the identical reveal, which lets a caller resubmit after
/// a lost submission.
#[derive(Debug)]
pub struct FinalitySigner {
    signer: SignerContext,
    consumed: ConsumedIndices,
}

impl FinalitySigner {
    pub fn new(signer: SignerContext) -> Self {
        Self::with_consumed(signer, ConsumedIndices::new())
    }

    /// Resume with indices revealed by an earlier run.
    pub fn with_consumed(signer: SignerContext, consumed: ConsumedIndices) -> Self {
        Self { signer, consumed }
    }

    pub fn signer(&self) -> &SignerContext {
        &self.signer
    }

    pub fn consumed(&self) -> &ConsumedIndices {
        &self.consumed
    }

    pub fn into_consumed(self) -> ConsumedIndices {
        self.consumed
    }

    /// Reveal `index` of `batch` with a signature over `message`.
    pub fn sign(
        &mut self,
        batch: &RandomnessBatch,
        index: u64,
        message: &[u8],
    ) -> Result<Reveal, RandomnessError> {
        batch.check_index(index)?;
        let signer_pk = *self.signer.public_key();
        if self
            .consumed
            .conflicts(&signer_pk, batch.commitment(), index, message)
        {
            tracing::warn!(index, commitment = %batch.commitment(), "index already revealed");
            return Err(RandomnessError::IndexAlreadyRevealed {
                index,
                commitment: *batch.commitment(),
            });
        }
        let revealed = reveal(batch, index, &self.signer, message)?;
        if self
            .consumed
            .claim(&signer_pk, batch.commitment(), index, message)?
            == Claim::Repeat
        {
            tracing::debug!(index, "reproduced earlier reveal");
        }
        Ok(revealed)
    }

    /// Vote for `block_hash` at `height` using the index reserved for it.
    pub fn sign_block(
        &mut self,
        batch: &RandomnessBatch,
        height: Height,
        block_hash: &BlockHash,
    ) -> Result<Reveal, RandomnessError> {
        let index = batch.index_of(height)?;
        let message = finality_message(height, block_hash);
        let revealed = self.sign(batch, index, &message)?;
        tracing::info!(height, index, block = %block_hash, "signed block");
        Ok(revealed)
    }
}
