//! Nullable finality ledger.
//!
//! Behaves like the on-chain finality contract as seen through the two
//! channels: it checks commitment signatures, checks every reveal against
//! the signer's committed range, records voters per block, and refuses a
//! second vote by the same signer at the same height. Knobs let tests delay
//! visibility and inject channel failures.

use pubrand_crypto::eots;
use pubrand_messages::{
    CommitmentPayload, CommitmentRecord, ExecuteMsg, QueryMsg, QueryResponse, RevealPayload,
};
use pubrand_randomness::finality_message;
use pubrand_types::{EotsSignature, Height, PubRand};
use pubrand_verifier::{Ack, ChannelError, QueryChannel, SubmissionChannel};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A signer that voted twice at one height.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Equivocation {
    pub signer: String,
    pub height: Height,
    /// Long-term key recovered from the two signatures, when both used the
    /// same committed randomness.
    pub extracted_secret_hex: Option<String>,
}

struct Visible<T> {
    from_query: u64,
    value: T,
}

#[derive(Default)]
struct State {
    commitments: HashMap<String, Vec<Visible<CommitmentRecord>>>,
    voters: HashMap<(Height, String), Vec<Visible<String>>>,
    votes: HashMap<(String, Height), RevealPayload>,
    submissions: Vec<ExecuteMsg>,
    equivocations: Vec<Equivocation>,
    queries: u64,
    confirmation_lag: u64,
    fail_queries: u32,
    fail_submissions: u32,
}

#[derive(Default)]
pub struct NullLedger {
    state: Mutex<State>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepted submissions only become visible after `queries` further
    /// queries.
    pub fn with_confirmation_lag(self, queries: u64) -> Self {
        self.lock().confirmation_lag = queries;
        self
    }

    /// Fail the next `n` queries with a channel error.
    pub fn fail_next_queries(&self, n: u32) {
        self.lock().fail_queries = n;
    }

    /// Fail the next `n` submissions with a channel error.
    pub fn fail_next_submissions(&self, n: u32) {
        self.lock().fail_submissions = n;
    }

    pub fn query_count(&self) -> u64 {
        self.lock().queries
    }

    /// Every submission that reached the ledger, accepted or not.
    pub fn submissions(&self) -> Vec<ExecuteMsg> {
        self.lock().submissions.clone()
    }

    pub fn equivocations(&self) -> Vec<Equivocation> {
        self.lock().equivocations.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn execute(&self, msg: &ExecuteMsg) -> Result<Ack, ChannelError> {
        let mut state = self.lock();
        state.submissions.push(msg.clone());
        if state.fail_submissions > 0 {
            state.fail_submissions -= 1;
            return Err(ChannelError::Submission("injected failure".into()));
        }
        let visible_from = state.queries + 1 + state.confirmation_lag;
        match msg {
            ExecuteMsg::CommitPublicRandomness(payload) => {
                commit(&mut state, payload, visible_from)?
            }
            ExecuteMsg::SubmitFinalitySignature(payload) => {
                vote(&mut state, payload, visible_from)?
            }
        }
        Ok(Ack {
            id: format!("tx-{}", state.submissions.len()),
        })
    }

    fn answer(&self, request: &QueryMsg) -> Result<QueryResponse, ChannelError> {
        let mut state = self.lock();
        state.queries += 1;
        if state.fail_queries > 0 {
            state.fail_queries -= 1;
            return Err(ChannelError::Query("injected failure".into()));
        }
        let now = state.queries;
        Ok(match request {
            QueryMsg::LastPubRandCommit {
                signer_public_key_hex,
            } => QueryResponse::LastCommitment(
                state
                    .commitments
                    .get(&signer_public_key_hex.to_lowercase())
                    .and_then(|records| records.iter().rev().find(|r| r.from_query <= now))
                    .map(|r| r.value.clone()),
            ),
            QueryMsg::BlockVoters { height, block_hash } => {
                let voters = state
                    .voters
                    .get(&(*height, block_hash.to_lowercase()))
                    .map(|voters| {
                        voters
                            .iter()
                            .filter(|v| v.from_query <= now)
                            .map(|v| v.value.clone())
                            .collect::<BTreeSet<_>>()
                    })
                    .unwrap_or_default();
                QueryResponse::Voters(voters.into_iter().collect())
            }
        })
    }
}

fn rejected(reason: impl std::fmt::Display) -> ChannelError {
    tracing::debug!(%reason, "ledger rejected submission");
    ChannelError::Submission(reason.to_string())
}

fn commit(
    state: &mut State,
    payload: &CommitmentPayload,
    visible_from: u64,
) -> Result<(), ChannelError> {
    payload.verify_signature().map_err(rejected)?;
    if payload.count == 0 {
        return Err(rejected("empty commitment"));
    }
    let signer = payload.signer_public_key_hex.to_lowercase();
    let records = state.commitments.entry(signer).or_default();
    if let Some(last) = records.last() {
        let end = last.value.start_height + (last.value.count - 1);
        if payload.start_height <= end {
            return Err(rejected(format!(
                "start height {} overlaps committed range ending at {end}",
                payload.start_height
            )));
        }
    }
    records.push(Visible {
        from_query: visible_from,
        value: payload.record(),
    });
    Ok(())
}

fn vote(state: &mut State, payload: &RevealPayload, visible_from: u64) -> Result<(), ChannelError> {
    let signer = payload.signer_public_key_hex.to_lowercase();
    let record = state
        .commitments
        .get(&signer)
        .and_then(|records| {
            records
                .iter()
                .rev()
                .find(|r| r.value.covers(payload.height))
        })
        .map(|r| r.value.clone())
        .ok_or_else(|| rejected(format!("no commitment covers height {}", payload.height)))?;
    payload.verify(&record).map_err(rejected)?;

    let key = (signer.clone(), payload.height);
    if let Some(previous) = state.votes.get(&key) {
        if previous.block_hash.eq_ignore_ascii_case(&payload.block_hash) {
            return Err(rejected("duplicated finality vote"));
        }
        let equivocation = Equivocation {
            signer: signer.clone(),
            height: payload.height,
            extracted_secret_hex: extract_key(previous, payload),
        };
        tracing::warn!(signer = %signer, height = payload.height, "equivocation detected");
        state.equivocations.push(equivocation);
        return Err(rejected("equivocation: conflicting finality vote"));
    }

    state.votes.insert(key, payload.clone());
    state
        .voters
        .entry((payload.height, payload.block_hash.to_lowercase()))
        .or_default()
        .push(Visible {
            from_query: visible_from,
            value: signer,
        });
    Ok(())
}

fn extract_key(first: &RevealPayload, second: &RevealPayload) -> Option<String> {
    if first.public_randomness != second.public_randomness {
        return None;
    }
    let signer = first.signer().ok()?;
    let pub_rand = PubRand::from_hex(&first.public_randomness).ok()?;
    let message = |p: &RevealPayload| -> Option<(Vec<u8>, EotsSignature)> {
        let hash = p.block_hash().ok()?;
        let sig = EotsSignature::from_hex(&p.signature).ok()?;
        Some((finality_message(p.height, &hash), sig))
    };
    let (m1, s1) = message(first)?;
    let (m2, s2) = message(second)?;
    eots::extract_secret_key(&signer, &pub_rand, &m1, &s1, &m2, &s2)
        .ok()
        .map(|key| key.expose_hex())
}

impl SubmissionChannel for NullLedger {
    fn submit(&self, msg: &ExecuteMsg) -> impl Future<Output = Result<Ack, ChannelError>> + Send {
        std::future::ready(self.execute(msg))
    }
}

impl QueryChannel for NullLedger {
    fn query(
        &self,
        request: &QueryMsg,
    ) -> impl Future<Output = Result<QueryResponse, ChannelError>> + Send {
        std::future::ready(self.answer(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubrand_randomness::{FinalitySigner, RandomnessBatch, SignerContext};
    use pubrand_types::BlockHash;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Fixture {
        ledger: NullLedger,
        signer: FinalitySigner,
        batch: RandomnessBatch,
    }

    fn fixture() -> Fixture {
        Fixture {
            ledger: NullLedger::new(),
            signer: FinalitySigner::new(SignerContext::from_seed(&[2u8; 32])),
            batch: RandomnessBatch::generate(1, 10, &mut StdRng::seed_from_u64(8)).unwrap(),
        }
    }

    impl Fixture {
        fn commit(&self) -> Result<Ack, ChannelError> {
            let payload = CommitmentPayload::new(self.signer.signer(), &self.batch).unwrap();
            self.ledger
                .execute(&ExecuteMsg::CommitPublicRandomness(payload))
        }

        fn vote(&mut self, height: Height, hash: BlockHash) -> Result<Ack, ChannelError> {
            let reveal = self.signer.sign_block(&self.batch, height, &hash).unwrap();
            self.submit_reveal(&reveal, hash)
        }

        fn submit_reveal(
            &self,
            reveal: &pubrand_randomness::Reveal,
            hash: BlockHash,
        ) -> Result<Ack, ChannelError> {
            let payload = RevealPayload::new(self.signer.signer().public_key(), reveal, &hash);
            self.ledger
                .execute(&ExecuteMsg::SubmitFinalitySignature(payload))
        }

        fn last_commit(&self) -> QueryResponse {
            self.ledger
                .answer(&QueryMsg::LastPubRandCommit {
                    signer_public_key_hex: self.signer.signer().public_key_hex(),
                })
                .unwrap()
        }

        fn voters(&self, height: Height, hash: BlockHash) -> QueryResponse {
            self.ledger
                .answer(&QueryMsg::BlockVoters {
                    height,
                    block_hash: hash.to_hex(),
                })
                .unwrap()
        }
    }

    #[test]
    fn commitment_visible_after_submit() {
        let f = fixture();
        assert_eq!(f.last_commit(), QueryResponse::LastCommitment(None));
        f.commit().unwrap();
        assert_eq!(
            f.last_commit(),
            QueryResponse::LastCommitment(Some(CommitmentRecord::new(
                1,
                10,
                f.batch.commitment()
            )))
        );
    }

    #[test]
    fn forged_commitment_rejected() {
        let f = fixture();
        let mut payload = CommitmentPayload::new(f.signer.signer(), &f.batch).unwrap();
        payload.start_height = 2;
        assert!(f
            .ledger
            .execute(&ExecuteMsg::CommitPublicRandomness(payload))
            .is_err());
        assert_eq!(f.ledger.submissions().len(), 1);
    }

    #[test]
    fn overlapping_commitment_rejected() {
        let f = fixture();
        f.commit().unwrap();
        assert!(f.commit().is_err());
    }

    #[test]
    fn vote_requires_commitment() {
        let mut f = fixture();
        assert!(f.vote(1, BlockHash::new([1u8; 32])).is_err());
    }

    #[test]
    fn vote_recorded() {
        let mut f = fixture();
        let hash = BlockHash::new([1u8; 32]);
        f.commit().unwrap();
        f.vote(3, hash).unwrap();
        assert_eq!(
            f.voters(3, hash),
            QueryResponse::Voters(vec![f.signer.signer().public_key_hex()])
        );
        assert_eq!(f.voters(3, BlockHash::new([2u8; 32])), QueryResponse::Voters(vec![]));
    }

    #[test]
    fn equivocation_leaks_key() {
        let f = fixture();
        f.commit().unwrap();
        // Bypass the single-use guard to model a faulty signer.
        let raw = SignerContext::from_seed(&[2u8; 32]);
        let a = BlockHash::new([0xA; 32]);
        let b = BlockHash::new([0xB; 32]);
        let first =
            pubrand_randomness::reveal(&f.batch, 4, &raw, &finality_message(5, &a)).unwrap();
        let second =
            pubrand_randomness::reveal(&f.batch, 4, &raw, &finality_message(5, &b)).unwrap();
        f.submit_reveal(&first, a).unwrap();
        assert!(f.submit_reveal(&second, b).is_err());

        let equivocations = f.ledger.equivocations();
        assert_eq!(equivocations.len(), 1);
        assert_eq!(equivocations[0].height, 5);
        assert_eq!(
            equivocations[0].extracted_secret_hex.as_deref(),
            Some(raw.expose_secret_hex().as_str())
        );
    }

    #[test]
    fn duplicate_vote_rejected() {
        let f = fixture();
        f.commit().unwrap();
        let raw = SignerContext::from_seed(&[2u8; 32]);
        let a = BlockHash::new([0xA; 32]);
        let r = pubrand_randomness::reveal(&f.batch, 0, &raw, &finality_message(1, &a)).unwrap();
        f.submit_reveal(&r, a).unwrap();
        assert!(f.submit_reveal(&r, a).is_err());
        assert!(f.ledger.equivocations().is_empty());
    }

    #[test]
    fn confirmation_lag_hides_new_state() {
        let f = Fixture {
            ledger: NullLedger::new().with_confirmation_lag(2),
            ..fixture()
        };
        f.commit().unwrap();
        assert_eq!(f.last_commit(), QueryResponse::LastCommitment(None));
        assert_eq!(f.last_commit(), QueryResponse::LastCommitment(None));
        assert!(matches!(f.last_commit(), QueryResponse::LastCommitment(Some(_))));
        assert_eq!(f.ledger.query_count(), 3);
    }

    #[test]
    fn injected_failures() {
        let f = fixture();
        f.ledger.fail_next_submissions(1);
        assert!(matches!(f.commit(), Err(ChannelError::Submission(_))));
        f.commit().unwrap();

        f.ledger.fail_next_queries(1);
        assert!(matches!(
            f.ledger.answer(&QueryMsg::BlockVoters {
                height: 1,
                block_hash: BlockHash::ZERO.to_hex()
            }),
            Err(ChannelError::Query(_))
        ));
        assert!(matches!(f.last_commit(), QueryResponse::LastCommitment(Some(_))));
    }
}
