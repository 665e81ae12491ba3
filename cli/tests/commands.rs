//! The commitment and finality-signature commands chained the way a
//! deployment script runs them: separate invocations, batch passed as JSON.

use pubrand_cli::commands::{generate_commitment, generate_finality_sig, generate_keypair};
use pubrand_messages::ExecuteMsg;
use pubrand_randomness::{ConsumedIndices, RandomnessError, SignerContext};

const BLOCK: &str = "5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a";

fn signer(secret_hex: &str) -> SignerContext {
    SignerContext::from_hex(secret_hex).unwrap()
}

fn commitment_json(secret_hex: &str) -> (String, pubrand_messages::CommitmentPayload) {
    let out = generate_commitment(&signer(secret_hex), 1, 100, Some(42)).unwrap();
    let payload = match &out.contract_message {
        ExecuteMsg::CommitPublicRandomness(p) => p.clone(),
        other => panic!("unexpected {other:?}"),
    };
    (serde_json::to_string(&out).unwrap(), payload)
}

#[test]
fn commitment_output_shape() {
    let key = generate_keypair(Some(1));
    let out = generate_commitment(&signer(&key.private_key), 10, 4, Some(2)).unwrap();
    let value = serde_json::to_value(&out).unwrap();

    let batch = &value["rand_list_info"];
    assert_eq!(batch["startHeight"], 10);
    assert_eq!(batch["secretRandomnessHex"].as_array().unwrap().len(), 4);
    assert_eq!(batch["proofs"].as_array().unwrap().len(), 4);

    let msg = &value["contract_message"]["commit_public_randomness"];
    assert_eq!(msg["signerPublicKeyHex"], key.public_key);
    assert_eq!(msg["count"], 4);
    assert_eq!(msg["commitment"], batch["commitmentHex"]);
}

#[test]
fn finality_sig_verifies_against_commitment() {
    let key = generate_keypair(Some(3));
    let (json, commit) = commitment_json(&key.private_key);
    commit.verify_signature().unwrap();

    let out = generate_finality_sig(signer(&key.private_key), &json, 1, BLOCK, None).unwrap();
    match out.contract_message {
        ExecuteMsg::SubmitFinalitySignature(reveal) => {
            assert_eq!(reveal.height, 1);
            assert_eq!(reveal.proof.index, 0);
            assert_eq!(reveal.block_hash, BLOCK);
            reveal.verify(&commit.record()).unwrap();
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn consumed_ledger_blocks_second_signature() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = dir.path().join("consumed.json");
    let key = generate_keypair(Some(4));
    let (json, commit) = commitment_json(&key.private_key);

    let first =
        generate_finality_sig(signer(&key.private_key), &json, 5, BLOCK, Some(&ledger)).unwrap();
    assert!(ledger.exists());

    // the same block again reproduces the same message for resubmission
    let again =
        generate_finality_sig(signer(&key.private_key), &json, 5, BLOCK, Some(&ledger)).unwrap();
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&again).unwrap()
    );

    let other_block = "00".repeat(32);
    let err = generate_finality_sig(
        signer(&key.private_key),
        &json,
        5,
        &other_block,
        Some(&ledger),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RandomnessError>(),
        Some(RandomnessError::IndexAlreadyRevealed { index: 4, .. })
    ));

    generate_finality_sig(signer(&key.private_key), &json, 6, BLOCK, Some(&ledger)).unwrap();
    let stored: ConsumedIndices =
        serde_json::from_str(&std::fs::read_to_string(&ledger).unwrap()).unwrap();
    let pk = signer(&key.private_key);
    assert_eq!(
        stored.consumed_count(pk.public_key(), &commit.commitment().unwrap()),
        2
    );
}

#[test]
fn height_outside_batch_is_rejected() {
    let key = generate_keypair(Some(5));
    let (json, _) = commitment_json(&key.private_key);
    assert!(generate_finality_sig(signer(&key.private_key), &json, 101, BLOCK, None).is_err());
    assert!(generate_finality_sig(signer(&key.private_key), &json, 0, BLOCK, None).is_err());
}

#[test]
fn corrupted_batch_is_rejected() {
    let key = generate_keypair(Some(6));
    let (json, _) = commitment_json(&key.private_key);
    let corrupted = json.replacen("\"startHeight\":1", "\"startHeight\":2", 1);
    assert_ne!(corrupted, json);
    // still decodes, but height 1 now falls before the batch
    assert!(generate_finality_sig(signer(&key.private_key), &corrupted, 1, BLOCK, None).is_err());

    assert!(generate_finality_sig(signer(&key.private_key), "{}", 1, BLOCK, None).is_err());
    assert!(generate_finality_sig(signer(&key.private_key), "not json", 1, BLOCK, None).is_err());
}

#[test]
fn malformed_block_hash_is_rejected() {
    let key = generate_keypair(Some(7));
    let (json, _) = commitment_json(&key.private_key);
    assert!(generate_finality_sig(signer(&key.private_key), &json, 1, "abcd", None).is_err());
}
