//! Fuzz target for decoding mission settings from arbitrary bytes.
//!
//! Run with: cargo +nightly fuzz run settings_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use mapsmith::{Document, MissionSettings};

fuzz_target!(|data: &[u8]| {
    let Ok(document) = Document::from_slice(data) else {
        return;
    };
    let Ok(settings) = MissionSettings::from_document(document) else {
        return;
    };

    // Whatever decodes must serialize and decode to the same state.
    let encoded = settings
        .to_document()
        .expect("decoded settings must serialize");
    let decoded = MissionSettings::from_document(encoded).expect("re-decode must succeed");
    assert_eq!(decoded, settings);
});
