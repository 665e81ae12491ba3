//! Bounded polling of the query channel.
//!
//! Each confirmation runs `Pending -> query -> Matched | NotFound | Mismatch`.
//! A match confirms; anything else waits one interval and queries again,
//! until `max_attempts` queries have been made. Cancellation is checked
//! before every query and every sleep, and interrupts either in progress.

use crate::{Discrepancy, QueryChannel, RetryClock, TokioClock, VerifierError};
use pubrand_messages::{QueryMsg, QueryResponse};
use pubrand_types::{BlockHash, Commitment, Height, PublicKey};
use pubrand_utils::format_duration;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How many queries to make and how long to wait between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Result<Self, VerifierError> {
        if max_attempts == 0 {
            return Err(VerifierError::InvalidParameter(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(3),
        }
    }
}

/// Successful confirmation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmed {
    /// Queries made, including the matching one.
    pub attempts: u32,
}

pub struct SubmissionVerifier<Q, C = TokioClock> {
    channel: Q,
    clock: C,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl<Q: QueryChannel, C: RetryClock> SubmissionVerifier<Q, C> {
    pub fn new(channel: Q, clock: C, policy: RetryPolicy) -> Self {
        Self {
            channel,
            clock,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Abort polling when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn channel(&self) -> &Q {
        &self.channel
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Wait for `duration` unless cancelled first.
    pub(crate) async fn sleep_cancellable(
        &self,
        duration: Duration,
        attempts: u32,
    ) -> Result<(), VerifierError> {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(attempts));
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(self.cancelled(attempts)),
            _ = self.clock.sleep(duration) => Ok(()),
        }
    }

    fn cancelled(&self, attempts: u32) -> VerifierError {
        tracing::warn!(attempts, "confirmation cancelled");
        VerifierError::Cancelled { attempts }
    }

    /// Confirm that the ledger holds exactly this commitment as the signer's
    /// latest.
    pub async fn confirm_commitment(
        &self,
        signer: &PublicKey,
        expected_start_height: Height,
        expected_count: u64,
        expected_commitment: &Commitment,
    ) -> Result<Confirmed, VerifierError> {
        let request = QueryMsg::LastPubRandCommit {
            signer_public_key_hex: signer.to_hex(),
        };
        self.poll("commitment", &request, |response| {
            check_commitment(
                response,
                expected_start_height,
                expected_count,
                expected_commitment,
            )
        })
        .await
    }

    /// Confirm that `expected_signer` is among the voters for
    /// `(height, block_hash)`.
    pub async fn confirm_reveal(
        &self,
        height: Height,
        expected_block_hash: &BlockHash,
        expected_signer: &PublicKey,
    ) -> Result<Confirmed, VerifierError> {
        let request = QueryMsg::BlockVoters {
            height,
            block_hash: expected_block_hash.to_hex(),
        };
        self.poll("reveal", &request, |response| {
            check_voters(response, expected_signer)
        })
        .await
    }

    async fn poll<F>(
        &self,
        what: &'static str,
        request: &QueryMsg,
        check: F,
    ) -> Result<Confirmed, VerifierError>
    where
        F: Fn(QueryResponse) -> Result<(), Discrepancy>,
    {
        let max = self.policy.max_attempts;
        let mut last = Discrepancy::NotFound;

        for attempt in 1..=max {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(attempt - 1));
            }
            let response = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(attempt)),
                response = self.channel.query(request) => response,
            };
            match response.map_err(Discrepancy::Query).and_then(&check) {
                Ok(()) => {
                    tracing::info!(what, attempt, "confirmed");
                    return Ok(Confirmed { attempts: attempt });
                }
                Err(discrepancy) => {
                    tracing::debug!(
                        what,
                        attempt,
                        max,
                        %discrepancy,
                        retry_in = %format_duration(self.policy.interval),
                        "not confirmed yet"
                    );
                    last = discrepancy;
                }
            }
            if attempt < max {
                self.sleep_cancellable(self.policy.interval, attempt).await?;
            }
        }

        tracing::warn!(what, attempts = max, last = %last, "confirmation attempts exhausted");
        Err(VerifierError::VerificationFailed {
            attempts: max,
            last,
        })
    }
}

fn check_commitment(
    response: QueryResponse,
    expected_start_height: Height,
    expected_count: u64,
    expected_commitment: &Commitment,
) -> Result<(), Discrepancy> {
    let record = match response {
        QueryResponse::LastCommitment(Some(record)) => record,
        QueryResponse::LastCommitment(None) => return Err(Discrepancy::NotFound),
        QueryResponse::Voters(_) => {
            return Err(Discrepancy::UnexpectedResponse(
                "voter set for a commitment query".into(),
            ))
        }
    };
    if record.start_height != expected_start_height {
        return Err(Discrepancy::StartHeight {
            expected: expected_start_height,
            actual: record.start_height,
        });
    }
    if record.count != expected_count {
        return Err(Discrepancy::Count {
            expected: expected_count,
            actual: record.count,
        });
    }
    let actual = record
        .commitment()
        .map_err(|e| Discrepancy::UnexpectedResponse(e.to_string()))?;
    if actual != *expected_commitment {
        return Err(Discrepancy::Commitment {
            expected: expected_commitment.to_hex(),
            actual: actual.to_hex(),
        });
    }
    Ok(())
}

fn check_voters(response: QueryResponse, expected_signer: &PublicKey) -> Result<(), Discrepancy> {
    let voters = match response {
        QueryResponse::Voters(voters) => voters,
        QueryResponse::LastCommitment(_) => {
            return Err(Discrepancy::UnexpectedResponse(
                "commitment for a voters query".into(),
            ))
        }
    };
    let signer = expected_signer.to_hex();
    if voters.iter().any(|v| v.eq_ignore_ascii_case(&signer)) {
        return Ok(());
    }
    if voters.is_empty() {
        return Err(Discrepancy::NotFound);
    }
    Err(Discrepancy::VoterMissing {
        voter: signer,
        voters: voters.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelError;
    use pubrand_messages::CommitmentRecord;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Replays scripted responses, repeating the last one.
    struct Scripted {
        responses: Mutex<Vec<Result<QueryResponse, ChannelError>>>,
        queries: AtomicU32,
    }

    impl Scripted {
        fn new(responses: Vec<Result<QueryResponse, ChannelError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                queries: AtomicU32::new(0),
            }
        }

        fn queries(&self) -> u32 {
            self.queries.load(Ordering::SeqCst)
        }
    }

    impl QueryChannel for Scripted {
        async fn query(&self, _request: &QueryMsg) -> Result<QueryResponse, ChannelError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                responses[0].clone()
            }
        }
    }

    /// Counts sleeps without waiting.
    #[derive(Default)]
    struct InstantClock {
        sleeps: AtomicU32,
    }

    impl RetryClock for InstantClock {
        async fn sleep(&self, _duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn signer() -> PublicKey {
        PublicKey::new([4u8; 32])
    }

    fn commitment() -> Commitment {
        Commitment::new([8u8; 32])
    }

    fn found(start: Height, count: u64, c: &Commitment) -> Result<QueryResponse, ChannelError> {
        Ok(QueryResponse::LastCommitment(Some(CommitmentRecord::new(start, count, c))))
    }

    fn verifier(
        script: Vec<Result<QueryResponse, ChannelError>>,
    ) -> SubmissionVerifier<Scripted, InstantClock> {
        SubmissionVerifier::new(
            Scripted::new(script),
            InstantClock::default(),
            RetryPolicy::new(5, Duration::from_millis(10)).unwrap(),
        )
    }

    #[test]
    fn zero_attempts_rejected() {
        assert!(matches!(
            RetryPolicy::new(0, Duration::ZERO),
            Err(VerifierError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn first_match_confirms() {
        let v = verifier(vec![found(1, 100, &commitment())]);
        let ok = v
            .confirm_commitment(&signer(), 1, 100, &commitment())
            .await
            .unwrap();
        assert_eq!(ok.attempts, 1);
        assert_eq!(v.clock.sleeps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn not_found_exhausts_after_five_queries() {
        let v = verifier(vec![Ok(QueryResponse::LastCommitment(None))]);
        let err = v
            .confirm_commitment(&signer(), 1, 100, &commitment())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifierError::VerificationFailed {
                attempts: 5,
                last: Discrepancy::NotFound
            }
        ));
        assert_eq!(v.channel().queries(), 5);
        assert_eq!(v.clock.sleeps.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn last_mismatch_is_reported() {
        let v = verifier(vec![
            Ok(QueryResponse::LastCommitment(None)),
            found(2, 100, &commitment()),
            found(1, 99, &commitment()),
        ]);
        let err = v
            .confirm_commitment(&signer(), 1, 100, &commitment())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifierError::VerificationFailed {
                last: Discrepancy::Count {
                    expected: 100,
                    actual: 99
                },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn mismatch_then_match_confirms() {
        let v = verifier(vec![
            found(1, 100, &Commitment::new([1u8; 32])),
            Err(ChannelError::Query("timeout".into())),
            found(1, 100, &commitment()),
        ]);
        let ok = v
            .confirm_commitment(&signer(), 1, 100, &commitment())
            .await
            .unwrap();
        assert_eq!(ok.attempts, 3);
    }

    #[tokio::test]
    async fn channel_errors_are_retried_then_reported() {
        let v = verifier(vec![Err(ChannelError::Query("connection refused".into()))]);
        let err = v
            .confirm_commitment(&signer(), 1, 100, &commitment())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifierError::VerificationFailed {
                attempts: 5,
                last: Discrepancy::Query(_)
            }
        ));
    }

    #[tokio::test]
    async fn voters_without_signer_is_mismatch() {
        let v = verifier(vec![Ok(QueryResponse::Voters(vec!["aa".repeat(32)]))]);
        let err = v
            .confirm_reveal(1, &BlockHash::ZERO, &signer())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifierError::VerificationFailed {
                last: Discrepancy::VoterMissing { voters: 1, .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn signer_in_voters_confirms() {
        let v = verifier(vec![
            Ok(QueryResponse::Voters(vec![])),
            Ok(QueryResponse::Voters(vec![
                "aa".repeat(32),
                signer().to_hex().to_uppercase(),
            ])),
        ]);
        let ok = v
            .confirm_reveal(1, &BlockHash::ZERO, &signer())
            .await
            .unwrap();
        assert_eq!(ok.attempts, 2);
    }

    #[tokio::test]
    async fn wrong_response_shape() {
        let v = verifier(vec![Ok(QueryResponse::Voters(vec![]))]);
        let err = v
            .confirm_commitment(&signer(), 1, 1, &commitment())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VerifierError::VerificationFailed {
                last: Discrepancy::UnexpectedResponse(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancelled_before_first_query() {
        let token = CancellationToken::new();
        token.cancel();
        let v = verifier(vec![found(1, 1, &commitment())]).with_cancellation(token);
        let err = v
            .confirm_commitment(&signer(), 1, 1, &commitment())
            .await
            .unwrap_err();
        assert!(matches!(err, VerifierError::Cancelled { attempts: 0 }));
        assert_eq!(v.channel().queries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_sleep() {
        let token = CancellationToken::new();
        let v = SubmissionVerifier::new(
            Scripted::new(vec![Ok(QueryResponse::LastCommitment(None))]),
            TokioClock,
            RetryPolicy::new(5, Duration::from_secs(3600)).unwrap(),
        )
        .with_cancellation(token.clone());

        let canceller = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            token.cancel();
        };
        let signer = signer();
        let commitment = commitment();
        let (result, ()) = tokio::join!(
            v.confirm_commitment(&signer, 1, 1, &commitment),
            canceller
        );
        assert!(matches!(result, Err(VerifierError::Cancelled { attempts: 1 })));
        assert_eq!(v.channel().queries(), 1);
    }
}
