//! AT command request/response frames (local and remote).

use bytes::Bytes;

use crate::{
    address::{Address16, Address64, AtCommand},
    error::{ParseError, ParseResult},
};

/// `0x08` Local AT Command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandRequest {
    /// Frame ID correlating the eventual [`AtCommandResponse`]. `0` disables
    /// correlation (no response expected).
    pub frame_id: u8,
    /// 2-ASCII-byte command mnemonic.
    pub command: AtCommand,
    /// Parameter bytes to set, or empty to query the current value.
    pub parameter: Bytes,
}

impl AtCommandRequest {
    pub(crate) const MIN_LEN: usize = 3;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.command.write(out);
        out.extend_from_slice(&self.parameter);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let command = AtCommand::read(&buf[1..3])?;
        Ok(Self { frame_id, command, parameter: Bytes::copy_from_slice(&buf[3..]) })
    }
}

/// `0x09` Local AT Command request, queued for the next `AC` (apply
/// changes) command rather than applied immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandQueuedRequest {
    /// Frame ID correlating the eventual response. `0` disables correlation.
    pub frame_id: u8,
    /// 2-ASCII-byte command mnemonic.
    pub command: AtCommand,
    /// Parameter bytes to set, or empty to query the current value.
    pub parameter: Bytes,
}

impl AtCommandQueuedRequest {
    pub(crate) const MIN_LEN: usize = 3;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.command.write(out);
        out.extend_from_slice(&self.parameter);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let command = AtCommand::read(&buf[1..3])?;
        Ok(Self { frame_id, command, parameter: Bytes::copy_from_slice(&buf[3..]) })
    }
}

/// Command status byte shared by local and remote AT command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtCommandStatus {
    /// `0x00` command accepted.
    Ok,
    /// `0x01` generic failure.
    Error,
    /// `0x02` mnemonic not recognized by the device.
    InvalidCommand,
    /// `0x03` parameter value out of range or malformed.
    InvalidParameter,
    /// `0x04` remote command could not be delivered.
    TransmissionFailure,
    /// Any other status byte.
    Unknown(u8),
}

impl AtCommandStatus {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Ok,
            0x01 => Self::Error,
            0x02 => Self::InvalidCommand,
            0x03 => Self::InvalidParameter,
            0x04 => Self::TransmissionFailure,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::Error => 0x01,
            Self::InvalidCommand => 0x02,
            Self::InvalidParameter => 0x03,
            Self::TransmissionFailure => 0x04,
            Self::Unknown(b) => b,
        }
    }

    /// Whether the command succeeded.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// `0x88` Local AT Command response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandResponse {
    /// Frame ID this response correlates with.
    pub frame_id: u8,
    /// Echoed command mnemonic.
    pub command: AtCommand,
    /// Outcome of the command.
    pub status: AtCommandStatus,
    /// Command value. Only meaningful when `status` is `Ok`; the device may
    /// omit it entirely for other statuses.
    pub value: Option<Bytes>,
}

impl AtCommandResponse {
    pub(crate) const MIN_LEN: usize = 4;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.command.write(out);
        out.push(self.status.to_byte());
        if let Some(value) = &self.value {
            out.extend_from_slice(value);
        }
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let command = AtCommand::read(&buf[1..3])?;
        let status = AtCommandStatus::from_byte(buf[3]);
        let remainder = &buf[4..];
        let value = (status.is_ok() || !remainder.is_empty())
            .then(|| Bytes::copy_from_slice(remainder))
            .filter(|v| !v.is_empty() || status.is_ok());
        Ok(Self { frame_id, command, status, value })
    }
}

/// `0x17` Remote AT Command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandRequest {
    /// Frame ID correlating the eventual response. `0` disables correlation.
    pub frame_id: u8,
    /// 64-bit destination address.
    pub dest64: Address64,
    /// 16-bit destination address (use [`Address16::UNKNOWN`] if not known).
    pub dest16: Address16,
    /// Whether the remote device should apply the change immediately.
    pub apply_changes: bool,
    /// 2-ASCII-byte command mnemonic.
    pub command: AtCommand,
    /// Parameter bytes to set, or empty to query the current value.
    pub parameter: Bytes,
}

impl RemoteAtCommandRequest {
    pub(crate) const MIN_LEN: usize = 14;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.dest64.write(out);
        self.dest16.write(out);
        out.push(u8::from(self.apply_changes) << 1);
        self.command.write(out);
        out.extend_from_slice(&self.parameter);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let dest64 = Address64::read(&buf[1..9])?;
        let dest16 = Address16::read(&buf[9..11])?;
        let apply_changes = buf[11] & 0x02 != 0;
        let command = AtCommand::read(&buf[12..14])?;
        Ok(Self {
            frame_id,
            dest64,
            dest16,
            apply_changes,
            command,
            parameter: Bytes::copy_from_slice(&buf[14..]),
        })
    }
}

/// `0x97` Remote AT Command response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandResponse {
    /// Frame ID this response correlates with.
    pub frame_id: u8,
    /// 64-bit source address of the responding device.
    pub source64: Address64,
    /// 16-bit source address of the responding device.
    pub source16: Address16,
    /// Echoed command mnemonic.
    pub command: AtCommand,
    /// Outcome of the command.
    pub status: AtCommandStatus,
    /// Command value. Only meaningful when `status` is `Ok`.
    pub value: Option<Bytes>,
}

impl RemoteAtCommandResponse {
    pub(crate) const MIN_LEN: usize = 14;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.source64.write(out);
        self.source16.write(out);
        self.command.write(out);
        out.push(self.status.to_byte());
        if let Some(value) = &self.value {
            out.extend_from_slice(value);
        }
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let source64 = Address64::read(&buf[1..9])?;
        let source16 = Address16::read(&buf[9..11])?;
        let command = AtCommand::read(&buf[11..13])?;
        let status = AtCommandStatus::from_byte(buf[13]);
        let remainder = &buf[14..];
        let value = (status.is_ok() || !remainder.is_empty())
            .then(|| Bytes::copy_from_slice(remainder))
            .filter(|v| !v.is_empty() || status.is_ok());
        Ok(Self { frame_id, source64, source16, command, status, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_command_request_round_trip() {
        let req = AtCommandRequest {
            frame_id: 1,
            command: AtCommand::new(*b"NP").unwrap(),
            parameter: Bytes::new(),
        };
        let mut buf = Vec::new();
        req.encode_fields(&mut buf);
        assert_eq!(AtCommandRequest::parse_fields(&buf).unwrap(), req);
    }

    #[test]
    fn at_command_response_absent_value_on_error() {
        let mut buf = vec![1, b'N', b'P', 0x01];
        let resp = AtCommandResponse::parse_fields(&buf).unwrap();
        assert_eq!(resp.status, AtCommandStatus::Error);
        assert_eq!(resp.value, None);

        buf[3] = 0x00;
        buf.extend_from_slice(&[0xAA, 0xBB]);
        let resp = AtCommandResponse::parse_fields(&buf).unwrap();
        assert_eq!(resp.value.as_deref(), Some(&[0xAA, 0xBB][..]));
    }

    #[test]
    fn short_payload_is_rejected() {
        assert!(matches!(
            AtCommandRequest::parse_fields(&[1, b'N']),
            Err(ParseError::IncompletePayload { .. })
        ));
    }
}
