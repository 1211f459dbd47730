//! Fuzz target for [`Frame::parse`] on arbitrary de-escaped payload bytes.
//!
//! Exercises the frame taxonomy directly, downstream of the wire envelope:
//! every frame-type byte, valid or not, paired with an arbitrary-length
//! body.
//!
//! # Invariants
//!
//! - `parse` never panics on any byte sequence, including an empty slice
//!   or a frame-type byte with no matching variant

#![no_main]

use libfuzzer_sys::fuzz_target;
use xbee_proto::Frame;

fuzz_target!(|data: &[u8]| {
    // must never panic, regardless of how `data` decodes.
    let _ = Frame::parse(data);
});
