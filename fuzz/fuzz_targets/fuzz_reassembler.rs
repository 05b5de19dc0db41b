//! Fuzz target: `ChunkReassembler::feed`
//!
//! Splits arbitrary bytes into notification-sized frames (first byte of
//! each chunk is its length) and feeds them to the reassembler. Asserts
//! that it never panics and never yields a payload longer than the
//! declared length allows.
//!
//! cargo fuzz run fuzz_reassembler

#![no_main]

use hwlink::link::chunked::ChunkReassembler;
use hwlink::link::codec::MAX_PAYLOAD_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reassembler = ChunkReassembler::new();
    let mut rest = data;
    let mut now = 0u64;

    while let Some((&len, tail)) = rest.split_first() {
        let take = (len as usize).min(tail.len());
        let (frame, next) = tail.split_at(take);
        rest = next;
        now += 1_000;

        if let Ok(Some(msg)) = reassembler.feed(frame, now) {
            assert!(msg.payload.len() <= MAX_PAYLOAD_LEN);
            assert!(!reassembler.is_active());
        }
        assert!(reassembler.received_len() <= MAX_PAYLOAD_LEN);
    }

    let _ = reassembler.expire(now + 10_000, 5_000);
    assert!(!reassembler.is_active());
});
