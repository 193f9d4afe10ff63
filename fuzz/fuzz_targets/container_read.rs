//! Fuzz target for reading containers from arbitrary bytes.
//!
//! Walks every record header and pulls each payload into memory. Declared
//! sizes are attacker-controlled, so this also checks that a huge size
//! fails cleanly instead of aborting on allocation.
//!
//! Run with: cargo +nightly fuzz run container_read

#![no_main]

use libfuzzer_sys::fuzz_target;
use zpack::ContainerReader;

fuzz_target!(|data: &[u8]| {
    for member in ContainerReader::new(data).members() {
        match member {
            Ok(info) => {
                let _ = info.name.to_string_lossy();
                let _ = info.record_len();
            }
            Err(_) => break,
        }
    }

    let mut reader = ContainerReader::new(data);
    while let Ok(Some((info, payload))) = reader.read_next_member_to_vec() {
        assert_eq!(payload.len() as u64, info.size);
    }
});
