//! User Data Relay frame pair: opaque payloads forwarded between local
//! device interfaces (serial, Bluetooth, MicroPython).

use bytes::Bytes;

use crate::error::{ParseError, ParseResult};

/// Local interface a relay frame targets or originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayInterface {
    /// `0x00` serial UART.
    Serial,
    /// `0x01` Bluetooth Low Energy.
    Bluetooth,
    /// `0x02` onboard MicroPython interpreter.
    MicroPython,
    /// Any interface byte not otherwise enumerated.
    Unknown(u8),
}

impl RelayInterface {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Serial,
            0x01 => Self::Bluetooth,
            0x02 => Self::MicroPython,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Serial => 0x00,
            Self::Bluetooth => 0x01,
            Self::MicroPython => 0x02,
            Self::Unknown(b) => b,
        }
    }
}

/// `0x2D` User Data Relay input: a request to forward `data` to `dest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelayInput {
    /// Interface to relay to.
    pub dest: RelayInterface,
    /// Opaque payload.
    pub data: Bytes,
}

impl UserDataRelayInput {
    pub(crate) const MIN_LEN: usize = 1;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.dest.to_byte());
        out.extend_from_slice(&self.data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self { dest: RelayInterface::from_byte(buf[0]), data: Bytes::copy_from_slice(&buf[1..]) })
    }
}

/// `0xAD` User Data Relay output: `data` received from `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelayOutput {
    /// Interface the payload arrived from.
    pub source: RelayInterface,
    /// Opaque payload.
    pub data: Bytes,
}

impl UserDataRelayOutput {
    pub(crate) const MIN_LEN: usize = 1;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.source.to_byte());
        out.extend_from_slice(&self.data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self { source: RelayInterface::from_byte(buf[0]), data: Bytes::copy_from_slice(&buf[1..]) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relay_output_round_trip() {
        let relay = UserDataRelayOutput { source: RelayInterface::Bluetooth, data: Bytes::from_static(b"hi") };
        let mut buf = Vec::new();
        relay.encode_fields(&mut buf);
        assert_eq!(UserDataRelayOutput::parse_fields(&buf).unwrap(), relay);
    }

    #[test]
    fn unknown_interface_round_trips() {
        let relay = UserDataRelayInput { dest: RelayInterface::Unknown(0x7F), data: Bytes::new() };
        let mut buf = Vec::new();
        relay.encode_fields(&mut buf);
        assert_eq!(UserDataRelayInput::parse_fields(&buf).unwrap(), relay);
    }
}
