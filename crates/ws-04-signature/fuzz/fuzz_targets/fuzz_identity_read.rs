//! Fuzz target for the `<Identity>` extension reader.
//!
//! ## Running
//!
//! ```bash
//! cd crates/ws-04-signature
//! cargo +nightly fuzz run fuzz_identity_read
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use shared_types::XmlElement;
use ws_03_endpoint_identity::read_identity;

/// Either raw text or a principal name dropped into a known identity shape.
#[derive(Debug, arbitrary::Arbitrary)]
enum FuzzInput {
    Raw(String),
    Principal { kind: u8, name: String },
}

const IDENTITY_NS: &str = "http://schemas.xmlsoap.org/ws/2006/02/addressingidentity";

fuzz_target!(|input: FuzzInput| {
    let text = match input {
        FuzzInput::Raw(text) => text,
        FuzzInput::Principal { kind, name } => {
            let local = ["Dns", "Upn", "Spn", "KeyInfo"][kind as usize % 4];
            format!("<Identity xmlns=\"{IDENTITY_NS}\"><{local}>{name}</{local}></Identity>")
        }
    };
    let Ok(element) = XmlElement::parse(&text) else {
        return;
    };

    // Reading must never panic, and whatever reads back must write the
    // same identity.
    if let Ok(identity) = read_identity(&element) {
        let written = identity.write_to();
        let reread = read_identity(&written).expect("written identity must read");
        assert_eq!(reread, identity);
        assert_eq!(reread.hash_code(), identity.hash_code());
    }
});
