//! Fuzz target: `PresenceDebouncer::update`
//!
//! Each input byte is one sample: bit 7 is the raw PIR level, the low bits
//! scaled by 50 are the milliseconds since the previous sample. Checks:
//! - A positive sample always reports presence
//! - Presence never clears before the hold time has fully elapsed
//!
//! cargo fuzz run fuzz_presence_debounce

#![no_main]

use guardian::control::debounce::PresenceDebouncer;
use libfuzzer_sys::fuzz_target;

const CLEAR_DELAY: u64 = 2_000;

fuzz_target!(|data: &[u8]| {
    let mut deb = PresenceDebouncer::new(CLEAR_DELAY);
    let mut now = 0u64;
    let mut was_active = false;

    for &b in data {
        let raw = b & 0x80 != 0;
        now += u64::from(b & 0x7F) * 50;
        let st = deb.update(raw, now).state;

        if raw {
            assert!(st.active);
        } else if was_active && !st.active {
            assert!(now - st.last_true_timestamp >= CLEAR_DELAY);
        }
        was_active = st.active;
    }
});
