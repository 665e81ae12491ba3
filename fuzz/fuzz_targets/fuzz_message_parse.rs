#![no_main]

use libfuzzer_sys::fuzz_target;
use pubrand_messages::{CommitmentRecord, ExecuteMsg, QueryMsg, QueryResponse};
use pubrand_types::Commitment;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<QueryMsg>(data);
    let _ = serde_json::from_slice::<QueryResponse>(data);

    // Verification of arbitrary payloads must fail cleanly, never panic.
    match serde_json::from_slice::<ExecuteMsg>(data) {
        Ok(ExecuteMsg::CommitPublicRandomness(payload)) => {
            let _ = payload.verify_signature();
        }
        Ok(ExecuteMsg::SubmitFinalitySignature(payload)) => {
            let record = CommitmentRecord::new(1, u64::MAX, &Commitment::new([0u8; 32]));
            let _ = payload.verify(&record);
        }
        Err(_) => {}
    }
});
