//! Submit-once, then confirm.

use crate::{
    Ack, Confirmed, QueryChannel, RetryClock, SubmissionChannel, SubmissionVerifier,
    VerifierError,
};
use pubrand_messages::{CommitmentPayload, ExecuteMsg, RevealPayload};
use pubrand_randomness::{FinalitySigner, RandomnessBatch, Reveal, SignerContext};
use pubrand_types::{BlockHash, Height, PublicKey};
use pubrand_utils::format_duration;
use std::time::Duration;

/// Outcome of a publish: the submission receipt and the confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Published {
    pub ack: Ack,
    pub confirmed: Confirmed,
}

/// Publishes commitments and reveals and waits until the ledger reflects
/// them.
///
/// A payload is submitted exactly once; a submission error is returned
/// as-is. After submitting, the publisher waits `settle_delay` for the
/// ledger to include it, then hands over to the verifier.
pub struct FinalityPublisher<S, Q, C> {
    submitter: S,
    verifier: SubmissionVerifier<Q, C>,
    settle_delay: Duration,
}

impl<S, Q, C> FinalityPublisher<S, Q, C>
where
    S: SubmissionChannel,
    Q: QueryChannel,
    C: RetryClock,
{
    pub fn new(submitter: S, verifier: SubmissionVerifier<Q, C>, settle_delay: Duration) -> Self {
        Self {
            submitter,
            verifier,
            settle_delay,
        }
    }

    pub fn verifier(&self) -> &SubmissionVerifier<Q, C> {
        &self.verifier
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    async fn submit(&self, msg: ExecuteMsg) -> Result<Ack, VerifierError> {
        if self.verifier.cancellation().is_cancelled() {
            return Err(VerifierError::Cancelled { attempts: 0 });
        }
        let ack = self.submitter.submit(&msg).await.inspect_err(|e| {
            tracing::error!(error = %e, "submission failed");
        })?;
        tracing::info!(id = %ack.id, "submitted");
        if !self.settle_delay.is_zero() {
            tracing::debug!(delay = %format_duration(self.settle_delay), "waiting for inclusion");
            self.verifier.sleep_cancellable(self.settle_delay, 0).await?;
        }
        Ok(ack)
    }

    /// Register `batch`'s commitment and confirm the ledger reports it.
    pub async fn publish_commitment(
        &self,
        signer: &SignerContext,
        batch: &RandomnessBatch,
    ) -> Result<Published, VerifierError> {
        let payload = CommitmentPayload::new(signer, batch)?;
        let ack = self
            .submit(ExecuteMsg::CommitPublicRandomness(payload))
            .await?;
        let confirmed = self
            .verifier
            .confirm_commitment(
                signer.public_key(),
                batch.start_height(),
                batch.count(),
                batch.commitment(),
            )
            .await?;
        Ok(Published { ack, confirmed })
    }

    /// Submit an already-produced reveal for `block_hash` and confirm the
    /// signer shows up among the block's voters.
    pub async fn publish_reveal(
        &self,
        signer: &PublicKey,
        reveal: &Reveal,
        block_hash: &BlockHash,
    ) -> Result<Published, VerifierError> {
        let payload = RevealPayload::new(signer, reveal, block_hash);
        let ack = self
            .submit(ExecuteMsg::SubmitFinalitySignature(payload))
            .await?;
        let confirmed = self
            .verifier
            .confirm_reveal(reveal.height, block_hash, signer)
            .await?;
        Ok(Published { ack, confirmed })
    }

    /// Sign `block_hash` at `height` with the batch entry reserved for it,
    /// then publish the reveal.
    ///
    /// After a failed submission the same call can be repeated: the signer
    /// reproduces the identical reveal for the same block.
    pub async fn publish_vote(
        &self,
        signer: &mut FinalitySigner,
        batch: &RandomnessBatch,
        height: Height,
        block_hash: &BlockHash,
    ) -> Result<Published, VerifierError> {
        let reveal = signer.sign_block(batch, height, block_hash)?;
        let public_key = *signer.signer().public_key();
        self.publish_reveal(&public_key, &reveal, block_hash).await
    }
}
