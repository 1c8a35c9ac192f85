//! Fuzz target: `ConfigStore::apply_json`
//!
//! Feeds arbitrary bytes as a configuration document and verifies:
//! - No panics on any input
//! - A rejected document leaves the previous snapshot and revision intact
//! - An accepted document always passes `validate()`
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use coopkeeper::config::ConfigStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let mut store = ConfigStore::default();
    let before = store.get();

    match store.apply_json(text) {
        Ok(()) => {
            assert!(store.get().validate().is_ok());
            assert_eq!(store.revision(), 1);
        }
        Err(_) => {
            assert_eq!(store.get(), before);
            assert_eq!(store.revision(), 0);
        }
    }
});
