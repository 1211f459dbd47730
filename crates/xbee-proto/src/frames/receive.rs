//! Receive indicator frames: the current (0x90) indicator and the legacy
//! series-1 16-/64-bit variants the packet queue still filters on.

use bytes::Bytes;

use crate::{
    address::{Address16, Address64},
    error::{ParseError, ParseResult},
};

/// Receive-option bitfield carried by [`Receive`] and the legacy RX frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions(pub u8);

impl ReceiveOptions {
    const BROADCAST_BIT: u8 = 0x02;

    /// Whether the broadcast bit is set.
    #[must_use]
    pub fn is_broadcast(self) -> bool {
        self.0 & Self::BROADCAST_BIT != 0
    }
}

/// `0x90` Receive Indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receive {
    /// 64-bit source address.
    pub source64: Address64,
    /// 16-bit source address.
    pub source16: Address16,
    /// Receive options (includes the broadcast bit).
    pub receive_options: ReceiveOptions,
    /// Received payload.
    pub rf_data: Bytes,
}

impl Receive {
    pub(crate) const MIN_LEN: usize = 11;

    /// Broadcast if the destination address was the broadcast address or
    /// the options bitfield's broadcast bit is set.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.receive_options.is_broadcast()
    }

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source64.write(out);
        self.source16.write(out);
        out.push(self.receive_options.0);
        out.extend_from_slice(&self.rf_data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source64: Address64::read(&buf[0..8])?,
            source16: Address16::read(&buf[8..10])?,
            receive_options: ReceiveOptions(buf[10]),
            rf_data: Bytes::copy_from_slice(&buf[11..]),
        })
    }
}

/// `0x81` legacy series-1 receive, addressed by 16-bit address only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx16 {
    /// 16-bit source address.
    pub source16: Address16,
    /// Received signal strength indicator, in `-dBm`.
    pub rssi: u8,
    /// Receive options.
    pub receive_options: ReceiveOptions,
    /// Received payload.
    pub rf_data: Bytes,
}

impl Rx16 {
    pub(crate) const MIN_LEN: usize = 4;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source16.write(out);
        out.push(self.rssi);
        out.push(self.receive_options.0);
        out.extend_from_slice(&self.rf_data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source16: Address16::read(&buf[0..2])?,
            rssi: buf[2],
            receive_options: ReceiveOptions(buf[3]),
            rf_data: Bytes::copy_from_slice(&buf[4..]),
        })
    }
}

/// `0x80` legacy series-1 receive, addressed by 64-bit address only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx64 {
    /// 64-bit source address.
    pub source64: Address64,
    /// Received signal strength indicator, in `-dBm`.
    pub rssi: u8,
    /// Receive options.
    pub receive_options: ReceiveOptions,
    /// Received payload.
    pub rf_data: Bytes,
}

impl Rx64 {
    pub(crate) const MIN_LEN: usize = 10;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source64.write(out);
        out.push(self.rssi);
        out.push(self.receive_options.0);
        out.extend_from_slice(&self.rf_data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source64: Address64::read(&buf[0..8])?,
            rssi: buf[8],
            receive_options: ReceiveOptions(buf[9]),
            rf_data: Bytes::copy_from_slice(&buf[10..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_round_trip() {
        let rx = Receive {
            source64: Address64([0, 0x13, 0xA2, 0, 0x40, 0xAA, 0xBB, 0xCC]),
            source16: Address16([0xFF, 0xFE]),
            receive_options: ReceiveOptions(0x02),
            rf_data: Bytes::from_static(b"hello"),
        };
        assert!(rx.is_broadcast());
        let mut buf = Vec::new();
        rx.encode_fields(&mut buf);
        assert_eq!(Receive::parse_fields(&buf).unwrap(), rx);
    }
}
