//! Fuzz target for ResourcePath validation.
//!
//! Accepted paths must stay inside the staging root.
//!
//! Run with: cargo +nightly fuzz run resource_path

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Component;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(path) = mapsmith::ResourcePath::new(text) {
        let relative = path.to_relative_path();
        assert!(
            relative
                .components()
                .all(|c| matches!(c, Component::Normal(_))),
            "escaping path accepted: {text:?}"
        );
        assert_eq!(path.components().count(), relative.components().count());
    }
});
