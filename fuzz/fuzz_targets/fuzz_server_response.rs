//! Fuzz target: coordination server response parsers
//!
//! Feeds arbitrary bytes to both inbound parsers and checks that:
//! - Neither parser panics
//! - `parse_relay_state` only decides on the exact bodies `1` / `0`
//! - Decoding is deterministic for the same bytes
//!
//! cargo fuzz run fuzz_server_response

#![no_main]

use guardian::coordination::wire::{parse_command, parse_relay_state};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse_relay_state(data) {
        Ok(true) => assert_eq!(data, b"1"),
        Ok(false) => assert_eq!(data, b"0"),
        Err(_) => assert!(data != b"1" && data != b"0"),
    }

    assert_eq!(parse_command(data), parse_command(data));
});
