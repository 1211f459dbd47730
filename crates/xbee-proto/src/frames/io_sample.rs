//! IO data sample indicator: a receive indicator whose trailing bytes encode
//! digital and analog channel readings rather than opaque application data.

use bytes::Bytes;

use crate::{
    address::{Address16, Address64},
    error::{ParseError, ParseResult},
    frames::receive::ReceiveOptions,
};

/// Minimum trailing length for the mask-plus-one-sample substructure: 2
/// bytes digital mask, 1 byte analog mask, 2 bytes for at least one sample.
const SUBSTRUCTURE_MIN_LEN: usize = 5;

/// Decoded digital/analog channel readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSample {
    /// Bitmask of which digital channels (0-12) are present.
    pub digital_mask: u16,
    /// Bitmask of which analog channels (0-7) are present.
    pub analog_mask: u8,
    /// Combined digital channel readings, one bit per channel. Present only
    /// when `digital_mask != 0`.
    pub digital_samples: Option<u16>,
    /// Per-channel analog readings, in ascending channel order.
    pub analog_samples: Vec<(u8, u16)>,
}

impl IoSample {
    fn parse(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < SUBSTRUCTURE_MIN_LEN {
            return Err(ParseError::IncompletePayload {
                expected: SUBSTRUCTURE_MIN_LEN,
                actual: buf.len(),
            });
        }
        let digital_mask = u16::from_be_bytes([buf[0], buf[1]]);
        let analog_mask = buf[2];
        let mut offset = 3;

        let digital_samples = if digital_mask != 0 {
            let bytes = buf
                .get(offset..offset + 2)
                .ok_or(ParseError::IncompletePayload { expected: offset + 2, actual: buf.len() })?;
            offset += 2;
            Some(u16::from_be_bytes([bytes[0], bytes[1]]))
        } else {
            None
        };

        let mut analog_samples = Vec::new();
        for channel in 0..8u8 {
            if analog_mask & (1 << channel) == 0 {
                continue;
            }
            let bytes = buf
                .get(offset..offset + 2)
                .ok_or(ParseError::IncompletePayload { expected: offset + 2, actual: buf.len() })?;
            offset += 2;
            analog_samples.push((channel, u16::from_be_bytes([bytes[0], bytes[1]])));
        }

        Ok(Self { digital_mask, analog_mask, digital_samples, analog_samples })
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.digital_mask.to_be_bytes());
        out.push(self.analog_mask);
        if let Some(digital) = self.digital_samples {
            out.extend_from_slice(&digital.to_be_bytes());
        }
        for (_, value) in &self.analog_samples {
            out.extend_from_slice(&value.to_be_bytes());
        }
    }
}

/// Decoded trailing payload of an IO data sample frame: either the parsed
/// [`IoSample`] substructure, or the raw bytes when too short to contain one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoPayload {
    /// Successfully decoded mask-plus-samples substructure.
    Samples(IoSample),
    /// Fewer than 5 trailing bytes; exposed as-is.
    Raw(Bytes),
}

impl IoPayload {
    fn parse(buf: &[u8]) -> Self {
        if buf.len() >= SUBSTRUCTURE_MIN_LEN {
            if let Ok(sample) = IoSample::parse(buf) {
                return Self::Samples(sample);
            }
        }
        Self::Raw(Bytes::copy_from_slice(buf))
    }

    fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Self::Samples(sample) => sample.encode(out),
            Self::Raw(bytes) => out.extend_from_slice(bytes),
        }
    }
}

/// `0x92` IO Data Sample RX Indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoDataSample {
    /// 64-bit source address.
    pub source64: Address64,
    /// 16-bit source address.
    pub source16: Address16,
    /// Receive options.
    pub receive_options: ReceiveOptions,
    /// Decoded (or raw) IO payload.
    pub io: IoPayload,
}

impl IoDataSample {
    pub(crate) const MIN_LEN: usize = 11;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source64.write(out);
        self.source16.write(out);
        out.push(self.receive_options.0);
        self.io.encode(out);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source64: Address64::read(&buf[0..8])?,
            source16: Address16::read(&buf[8..10])?,
            receive_options: ReceiveOptions(buf[10]),
            io: IoPayload::parse(&buf[11..]),
        })
    }
}

/// `0x83` legacy series-1 IO sample, addressed by 16-bit address only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx16Io {
    /// 16-bit source address.
    pub source16: Address16,
    /// Received signal strength indicator, in `-dBm`.
    pub rssi: u8,
    /// Receive options.
    pub receive_options: ReceiveOptions,
    /// Decoded (or raw) IO payload.
    pub io: IoPayload,
}

impl Rx16Io {
    pub(crate) const MIN_LEN: usize = 4;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source16.write(out);
        out.push(self.rssi);
        out.push(self.receive_options.0);
        self.io.encode(out);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source16: Address16::read(&buf[0..2])?,
            rssi: buf[2],
            receive_options: ReceiveOptions(buf[3]),
            io: IoPayload::parse(&buf[4..]),
        })
    }
}

/// `0x82` legacy series-1 IO sample, addressed by 64-bit address only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx64Io {
    /// 64-bit source address.
    pub source64: Address64,
    /// Received signal strength indicator, in `-dBm`.
    pub rssi: u8,
    /// Receive options.
    pub receive_options: ReceiveOptions,
    /// Decoded (or raw) IO payload.
    pub io: IoPayload,
}

impl Rx64Io {
    pub(crate) const MIN_LEN: usize = 10;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source64.write(out);
        out.push(self.rssi);
        out.push(self.receive_options.0);
        self.io.encode(out);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            source64: Address64::read(&buf[0..8])?,
            rssi: buf[8],
            receive_options: ReceiveOptions(buf[9]),
            io: IoPayload::parse(&buf[10..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_trailing_bytes_stay_raw() {
        let mut buf = vec![0u8; 11];
        buf.extend_from_slice(&[0x01, 0x02]);
        let sample = IoDataSample::parse_fields(&buf).unwrap();
        assert!(matches!(sample.io, IoPayload::Raw(_)));
    }

    #[test]
    fn digital_and_analog_samples_round_trip() {
        let io = IoSample {
            digital_mask: 0x0004,
            analog_mask: 0b0000_0010,
            digital_samples: Some(0x0004),
            analog_samples: vec![(1, 0x03FF)],
        };
        let mut encoded = Vec::new();
        io.encode(&mut encoded);
        assert_eq!(encoded.len(), 7);
        assert_eq!(IoSample::parse(&encoded).unwrap(), io);
    }
}
