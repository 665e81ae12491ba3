#![no_main]

use libfuzzer_sys::fuzz_target;
use pubrand_randomness::codec;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    // Decoding arbitrary input must never panic. Anything that decodes is
    // internally consistent, so it must re-encode to an equal batch.
    if let Ok(batch) = codec::from_json(json) {
        batch.verify_proofs().expect("decoded batch has valid proofs");
        assert_eq!(batch.recompute_commitment(), *batch.commitment());
        let again = codec::from_json(&codec::to_json(&batch).unwrap()).unwrap();
        assert_eq!(again, batch);
    }
});
