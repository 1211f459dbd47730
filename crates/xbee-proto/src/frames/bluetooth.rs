//! Bluetooth unlock request/response frame pair carrying the SRP exchange
//! the C4 sequencer drives.

use bytes::Bytes;

use crate::error::{ParseError, ParseResult};

/// SRP phase byte carried by [`BluetoothUnlockRequest`] and the non-error
/// arm of [`BluetoothUnlockResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SrpPhase {
    /// `0x01` client presents `A`, server presents salt and `B`.
    Phase1,
    /// `0x02` client presents `M1`, server presents `M2`.
    Phase2,
    /// `0x03` client presents an encrypted nonce/IV.
    Phase3,
    /// `0x04` server acknowledges with its own nonce/IV.
    Phase4,
    /// Any phase byte not otherwise enumerated.
    Unknown(u8),
}

impl SrpPhase {
    fn from_byte(b: u8) -> Self {
        match b {
            0x01 => Self::Phase1,
            0x02 => Self::Phase2,
            0x03 => Self::Phase3,
            0x04 => Self::Phase4,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Phase1 => 0x01,
            Self::Phase2 => 0x02,
            Self::Phase3 => 0x03,
            Self::Phase4 => 0x04,
            Self::Unknown(b) => b,
        }
    }
}

/// `0x2C` Bluetooth Unlock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BluetoothUnlockRequest {
    /// Which leg of the exchange this message carries.
    pub phase: SrpPhase,
    /// Phase-specific opaque payload (`A`, `M1`, or the encrypted nonce/IV).
    pub payload: Bytes,
}

impl BluetoothUnlockRequest {
    pub(crate) const MIN_LEN: usize = 1;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.phase.to_byte());
        out.extend_from_slice(&self.payload);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self { phase: SrpPhase::from_byte(buf[0]), payload: Bytes::copy_from_slice(&buf[1..]) })
    }
}

/// `0xAC` Bluetooth Unlock response: either the matching phase's payload, or
/// an SRP error code when the device rejects the exchange outright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BluetoothUnlockResponse {
    /// Salt/`B`, `M2`, or the server's nonce/IV, keyed by phase.
    Phase {
        /// Which leg of the exchange this message carries.
        phase: SrpPhase,
        /// Phase-specific opaque payload.
        payload: Bytes,
    },
    /// The device rejected the exchange; see the GLOSSARY error-code list
    /// (unable-to-offer-B, incorrect-payload-length, bad-proof-key,
    /// resource-allocation, out-of-sequence).
    Error(u8),
}

impl BluetoothUnlockResponse {
    pub(crate) const MIN_LEN: usize = 1;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        match self {
            Self::Phase { phase, payload } => {
                out.push(phase.to_byte());
                out.extend_from_slice(payload);
            }
            Self::Error(code) => {
                out.push(0x00);
                out.push(*code);
            }
        }
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let phase = SrpPhase::from_byte(buf[0]);
        let remainder = &buf[1..];
        if matches!(phase, SrpPhase::Unknown(_)) && remainder.len() == 1 {
            return Ok(Self::Error(remainder[0]));
        }
        Ok(Self::Phase { phase, payload: Bytes::copy_from_slice(remainder) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trip() {
        let req = BluetoothUnlockRequest { phase: SrpPhase::Phase1, payload: Bytes::from_static(b"A-value") };
        let mut buf = Vec::new();
        req.encode_fields(&mut buf);
        assert_eq!(BluetoothUnlockRequest::parse_fields(&buf).unwrap(), req);
    }

    #[test]
    fn unknown_phase_with_one_byte_is_an_error() {
        let buf = [0xFF, 0x02];
        let resp = BluetoothUnlockResponse::parse_fields(&buf).unwrap();
        assert_eq!(resp, BluetoothUnlockResponse::Error(0x02));
    }

    #[test]
    fn unknown_phase_with_other_lengths_stays_a_payload() {
        let buf = [0xFF, 0x02, 0x03];
        let resp = BluetoothUnlockResponse::parse_fields(&buf).unwrap();
        assert_eq!(resp, BluetoothUnlockResponse::Phase { phase: SrpPhase::Unknown(0xFF), payload: Bytes::from_static(&[0x02, 0x03]) });
    }
}
