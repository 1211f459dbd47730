//! Wire framer: the delimiter/length/checksum envelope frames travel in,
//! plus the API-2 escape rule.
//!
//! Layout on the wire:
//! `[0x7E delimiter: 1 byte] + [length: 2 bytes, MSB first] + [payload: N bytes] + [checksum: 1 byte]`
//!
//! `length` counts only the payload; `checksum` is `0xFF` minus the
//! low byte of the payload's sum. In [`ApiMode::Escaped`], every reserved
//! byte inside the length, payload, and checksum (never the leading
//! delimiter) is byte-stuffed: replaced by `0x7D` followed by the byte
//! XOR `0x20`.

use bytes::{BufMut, Bytes};

use crate::error::{FrameError, FrameResult};

const DELIMITER: u8 = 0x7E;
const ESCAPE: u8 = 0x7D;
const ESCAPE_XOR: u8 = 0x20;

fn is_reserved(b: u8) -> bool {
    matches!(b, 0x7E | 0x7D | 0x11 | 0x13)
}

/// Whether the wire framer escapes reserved bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    /// API-1: bytes are transmitted verbatim.
    Unescaped,
    /// API-2: reserved bytes are byte-stuffed.
    Escaped,
}

fn checksum(payload: &[u8]) -> u8 {
    let sum: u8 = payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    0xFF - sum
}

fn push_maybe_escaped(out: &mut Vec<u8>, byte: u8, mode: ApiMode) {
    if mode == ApiMode::Escaped && is_reserved(byte) {
        out.push(ESCAPE);
        out.push(byte ^ ESCAPE_XOR);
    } else {
        out.push(byte);
    }
}

/// Wrap a frame payload in the delimiter/length/checksum envelope, escaping
/// reserved bytes when `mode` is [`ApiMode::Escaped`].
///
/// # Panics
///
/// Panics if `payload.len()` exceeds `u16::MAX`; the wire length field is
/// 16 bits and no frame variant in this codec produces payloads anywhere
/// near that size.
#[must_use]
pub fn wrap(payload: &[u8], mode: ApiMode) -> Bytes {
    let len = u16::try_from(payload.len())
        .unwrap_or_else(|_| unreachable!("no frame variant in this codec produces payloads near u16::MAX"));
    let check = checksum(payload);

    let mut out = Vec::with_capacity(payload.len() + 4);
    out.put_u8(DELIMITER);
    for byte in len.to_be_bytes() {
        push_maybe_escaped(&mut out, byte, mode);
    }
    for &byte in payload {
        push_maybe_escaped(&mut out, byte, mode);
    }
    push_maybe_escaped(&mut out, check, mode);
    Bytes::from(out)
}

/// Result of a successful [`unwrap`]: the extracted payload and how many
/// bytes of `stream` it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwrapped {
    /// De-escaped payload bytes.
    pub payload: Bytes,
    /// Number of leading bytes of the input stream this frame consumed.
    pub consumed: usize,
}

/// Locate and decode one frame from the front of `stream`.
///
/// On sync loss (no `0x7E` anywhere in `stream`), returns
/// `FrameError::SyncLost` with `consumed` bytes to discard available via the
/// caller re-slicing `stream` — callers should drop the returned error's
/// worth of bytes and retry on the next delimiter rather than aborting the
/// whole stream.
///
/// # Errors
///
/// `FrameError::SyncLost` if no delimiter is present. `FrameError::TruncatedFrame`
/// if a delimiter is found but not enough bytes follow to complete a frame.
/// `FrameError::ChecksumMismatch` if the frame is complete but its checksum
/// does not verify.
pub fn unwrap(stream: &[u8], mode: ApiMode) -> FrameResult<Unwrapped> {
    let start = stream.iter().position(|&b| b == DELIMITER).ok_or(FrameError::SyncLost)?;
    let mut cursor = start + 1;

    let mut length_bytes = [0u8; 2];
    for slot in &mut length_bytes {
        *slot = read_maybe_escaped(stream, &mut cursor, mode)?;
    }
    let length = u16::from_be_bytes(length_bytes) as usize;

    let mut payload = Vec::with_capacity(length);
    for _ in 0..length {
        payload.push(read_maybe_escaped(stream, &mut cursor, mode)?);
    }
    let found_checksum = read_maybe_escaped(stream, &mut cursor, mode)?;

    let computed = checksum(&payload);
    if computed != found_checksum {
        return Err(FrameError::ChecksumMismatch { computed, found: found_checksum });
    }

    Ok(Unwrapped { payload: Bytes::from(payload), consumed: cursor })
}

/// Read one logical byte starting at `*cursor`, de-escaping in
/// [`ApiMode::Escaped`] mode and advancing `*cursor` past whatever it
/// consumed. Reports `TruncatedFrame` instead of panicking when `stream` runs
/// out mid-frame.
fn read_maybe_escaped(stream: &[u8], cursor: &mut usize, mode: ApiMode) -> FrameResult<u8> {
    let raw = *stream.get(*cursor).ok_or(FrameError::TruncatedFrame { needed: 1 })?;
    *cursor += 1;
    if mode == ApiMode::Escaped && raw == ESCAPE {
        let escaped = *stream.get(*cursor).ok_or(FrameError::TruncatedFrame { needed: 1 })?;
        *cursor += 1;
        Ok(escaped ^ ESCAPE_XOR)
    } else {
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescaped_round_trip() {
        let payload = [0x01, 0x02, 0x03];
        let wire = wrap(&payload, ApiMode::Unescaped);
        let unwrapped = unwrap(&wire, ApiMode::Unescaped).unwrap();
        assert_eq!(unwrapped.payload.as_ref(), &payload);
        assert_eq!(unwrapped.consumed, wire.len());
    }

    #[test]
    fn escaped_round_trip_with_reserved_bytes_in_payload() {
        let payload = [0x7E, 0x7D, 0x11, 0x13, 0xAA];
        let wire = wrap(&payload, ApiMode::Escaped);
        // the leading delimiter is never escaped, but every occurrence of a
        // reserved byte afterward must be stuffed.
        assert_eq!(wire[0], DELIMITER);
        assert!(wire.len() > payload.len() + 4);
        let unwrapped = unwrap(&wire, ApiMode::Escaped).unwrap();
        assert_eq!(unwrapped.payload.as_ref(), &payload);
    }

    #[test]
    fn wire_wrap_scenario_from_spec() {
        // 7E 00 01 08 F7  (single-byte payload 0x08, checksum 0xF7)
        let wire = wrap(&[0x08], ApiMode::Unescaped);
        assert_eq!(&wire[..], &[0x7E, 0x00, 0x01, 0x08, 0xF7]);
    }

    #[test]
    fn escape_round_trip_scenario_from_spec() {
        let payload = [0x7E, 0x11, 0x42];
        let wire = wrap(&payload, ApiMode::Escaped);
        assert_eq!(&wire[..], &[0x7E, 0x00, 0x03, 0x7D, 0x5E, 0x7D, 0x31, 0x42, 0x2F]);
        assert_eq!(unwrap(&wire, ApiMode::Escaped).unwrap().payload.as_ref(), &payload);
    }

    #[test]
    fn checksum_mismatch_is_reported() {
        let mut wire = wrap(&[0x01, 0x02], ApiMode::Unescaped).to_vec();
        let last = wire.len() - 1;
        wire[last] ^= 0xFF;
        assert!(matches!(unwrap(&wire, ApiMode::Unescaped), Err(FrameError::ChecksumMismatch { .. })));
    }

    #[test]
    fn truncated_frame_is_reported() {
        let wire = wrap(&[0x01, 0x02, 0x03], ApiMode::Unescaped);
        assert!(matches!(
            unwrap(&wire[..wire.len() - 2], ApiMode::Unescaped),
            Err(FrameError::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn sync_loss_with_no_delimiter() {
        assert_eq!(unwrap(&[0x01, 0x02, 0x03], ApiMode::Unescaped), Err(FrameError::SyncLost));
    }

    #[test]
    fn resync_after_garbage_prefix() {
        let mut stream = vec![0xFF, 0xFF, 0xFF];
        stream.extend_from_slice(&wrap(&[0x08], ApiMode::Unescaped));
        let unwrapped = unwrap(&stream, ApiMode::Unescaped).unwrap();
        assert_eq!(unwrapped.payload.as_ref(), &[0x08]);
    }
}
