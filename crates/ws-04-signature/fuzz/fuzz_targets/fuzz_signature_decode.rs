//! Fuzz target for the dictionary-encoded signature reader.
//!
//! ## Running
//!
//! ```bash
//! cd crates/ws-04-signature
//! cargo +nightly fuzz run fuzz_signature_decode
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use shared_types::DictionaryManager;
use ws_04_signature::{Signature, SignatureValueElement};

fuzz_target!(|data: &[u8]| {
    let dictionary = DictionaryManager::ws_security();

    // Decoding must never panic, whatever the input.
    let Ok(signature) = Signature::read_binary(data, &dictionary) else {
        return;
    };

    // A decoded signature re-encodes to a form that decodes to itself.
    let encoded = signature.write_to(&dictionary);
    let decoded = Signature::read_binary(&encoded, &dictionary)
        .expect("re-encoded signature must decode");
    assert_eq!(decoded, signature);
    assert!(!decoded.signature_value().is_empty());
});
