//! Fuzz target: `FeedTime` parsing
//!
//! Anything that parses must be in range and print back to the exact input.
//!
//! cargo fuzz run fuzz_feed_time

#![no_main]

use coopkeeper::config::FeedTime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(t) = text.parse::<FeedTime>() {
        assert!(t.hour() < 24);
        assert!(t.minute() < 60);
        assert_eq!(t.to_string(), text);
    }
});
