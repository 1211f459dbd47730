//! Wire-exact address and identifier newtypes.
//!
//! All multi-byte fields are big-endian on the wire. These types exist so
//! that frame variants can't accidentally transpose a 16-bit and a 64-bit
//! address, or forget to zero-pad a phone number.

use crate::error::ParseError;

/// 64-bit IEEE/ZigBee address, 8 bytes, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address64(pub [u8; 8]);

impl Address64 {
    /// Broadcast address `0x000000000000FFFF`.
    pub const BROADCAST: Self = Self([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF]);

    /// Unknown/unassigned address, all zero.
    pub const UNKNOWN: Self = Self([0; 8]);

    /// Read 8 bytes from the front of `buf`.
    pub fn read(buf: &[u8]) -> ParseResultAddr<Self> {
        let arr: [u8; 8] = buf
            .get(..8)
            .ok_or(ParseError::IncompletePayload { expected: 8, actual: buf.len() })?
            .try_into()
            .unwrap_or_else(|_| unreachable!("slice of len 8"));
        Ok(Self(arr))
    }

    /// Append the 8 big-endian bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// Whether this address is the broadcast address.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

/// 16-bit network address, 2 bytes, MSB first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address16(pub [u8; 2]);

impl Address16 {
    /// Broadcast address `0xFFFE`.
    pub const BROADCAST: Self = Self([0xFF, 0xFE]);

    /// Unknown 16-bit address `0xFFFE`, the same value XBee firmware uses
    /// when the 16-bit address has not been resolved.
    pub const UNKNOWN: Self = Self([0xFF, 0xFE]);

    /// Read 2 bytes from the front of `buf`.
    pub fn read(buf: &[u8]) -> ParseResultAddr<Self> {
        let arr: [u8; 2] = buf
            .get(..2)
            .ok_or(ParseError::IncompletePayload { expected: 2, actual: buf.len() })?
            .try_into()
            .unwrap_or_else(|_| unreachable!("slice of len 2"));
        Ok(Self(arr))
    }

    /// Append the 2 big-endian bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// Whether this address is the broadcast address.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

/// 2-byte ZigBee cluster identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(pub [u8; 2]);

impl ClusterId {
    /// Read 2 bytes from the front of `buf`.
    pub fn read(buf: &[u8]) -> ParseResultAddr<Self> {
        Address16::read(buf).map(|a| Self(a.0))
    }

    /// Append the 2 big-endian bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// Numeric value.
    #[must_use]
    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.0)
    }
}

/// 2-byte ZigBee profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileId(pub [u8; 2]);

impl ProfileId {
    /// Read 2 bytes from the front of `buf`.
    pub fn read(buf: &[u8]) -> ParseResultAddr<Self> {
        Address16::read(buf).map(|a| Self(a.0))
    }

    /// Append the 2 big-endian bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// Numeric value.
    #[must_use]
    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.0)
    }
}

/// Endpoint byte (application-layer source/destination endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(pub u8);

/// 2-ASCII-character AT command mnemonic (e.g. `NP`, `BD`, `KY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommand(pub [u8; 2]);

impl AtCommand {
    /// Build a command from a 2-byte ASCII mnemonic.
    ///
    /// # Errors
    ///
    /// `ParseError::FieldConstraintViolation` if either byte is not ASCII.
    pub fn new(mnemonic: [u8; 2]) -> Result<Self, ParseError> {
        if !mnemonic.iter().all(u8::is_ascii) {
            return Err(ParseError::FieldConstraintViolation("AT command must be ASCII"));
        }
        Ok(Self(mnemonic))
    }

    /// Read 2 bytes from the front of `buf`.
    pub fn read(buf: &[u8]) -> ParseResultAddr<Self> {
        let arr: [u8; 2] = buf
            .get(..2)
            .ok_or(ParseError::IncompletePayload { expected: 2, actual: buf.len() })?
            .try_into()
            .unwrap_or_else(|_| unreachable!("slice of len 2"));
        Ok(Self(arr))
    }

    /// Append the 2 bytes to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.0);
    }

    /// The mnemonic rendered as a `&str`, if valid UTF-8 (it always is, since
    /// construction enforces ASCII).
    #[must_use]
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

type ParseResultAddr<T> = Result<T, ParseError>;

/// Encode a phone number as the fixed 20-byte, right-zero-padded field used
/// by the SMS frame pair.
///
/// # Errors
///
/// `ParseError::FieldConstraintViolation` if `number` is longer than 20
/// bytes or is not valid UTF-8 once padded (non-ASCII digits are never
/// produced by valid callers, but the check is cheap insurance either way).
pub fn encode_phone_number(number: &str) -> Result<[u8; 20], ParseError> {
    let bytes = number.as_bytes();
    if bytes.len() > 20 {
        return Err(ParseError::FieldConstraintViolation("phone number exceeds 20 bytes"));
    }
    let mut field = [0u8; 20];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

/// Decode the fixed 20-byte phone number field, trimming trailing NULs.
///
/// # Errors
///
/// `ParseError::FieldConstraintViolation` if the field is not valid UTF-8
/// once NUL-trimmed.
pub fn decode_phone_number(field: &[u8; 20]) -> Result<String, ParseError> {
    let end = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    std::str::from_utf8(&field[..end])
        .map(str::to_owned)
        .map_err(|_| ParseError::FieldConstraintViolation("phone number is not valid UTF-8"))
}

/// Encode an IMEI as the fixed 8-byte, left-zero-padded field.
///
/// # Errors
///
/// `ParseError::FieldConstraintViolation` if `imei` is longer than 8 bytes.
pub fn encode_imei(imei: &[u8]) -> Result<[u8; 8], ParseError> {
    if imei.len() > 8 {
        return Err(ParseError::FieldConstraintViolation("IMEI exceeds 8 bytes"));
    }
    let mut field = [0u8; 8];
    field[8 - imei.len()..].copy_from_slice(imei);
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_number_round_trip() {
        let encoded = encode_phone_number("+15551234567").unwrap();
        assert_eq!(encoded.len(), 20);
        assert_eq!(decode_phone_number(&encoded).unwrap(), "+15551234567");
    }

    #[test]
    fn phone_number_too_long() {
        assert!(encode_phone_number("0".repeat(21).as_str()).is_err());
    }

    #[test]
    fn address_broadcast() {
        assert!(Address64::BROADCAST.is_broadcast());
        assert!(Address16::BROADCAST.is_broadcast());
        assert!(!Address64::UNKNOWN.is_broadcast());
    }

    #[test]
    fn at_command_rejects_non_ascii() {
        assert!(AtCommand::new([0xFF, 0x01]).is_err());
        assert!(AtCommand::new(*b"NP").is_ok());
    }
}
