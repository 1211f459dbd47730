//! Cellular SMS send/receive frames.

use crate::{
    address::{decode_phone_number, encode_phone_number},
    error::{ParseError, ParseResult},
};

/// `0x1F` TX SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSms {
    /// Frame ID correlating the eventual transmit status. `0` disables
    /// correlation.
    pub frame_id: u8,
    /// Destination phone number, trimmed of trailing NULs.
    pub phone_number: String,
    /// Message body.
    pub data: String,
}

impl TxSms {
    pub(crate) const MIN_LEN: usize = 22;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) -> ParseResult<()> {
        out.push(self.frame_id);
        out.push(0x00);
        out.extend_from_slice(&encode_phone_number(&self.phone_number)?);
        out.extend_from_slice(self.data.as_bytes());
        Ok(())
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let frame_id = buf[0];
        let phone_field: [u8; 20] = buf[2..22].try_into().unwrap_or_else(|_| unreachable!("slice of len 20"));
        let phone_number = decode_phone_number(&phone_field)?;
        let data = String::from_utf8(buf[22..].to_vec())
            .map_err(|_| ParseError::FieldConstraintViolation("SMS body must be UTF-8"))?;
        Ok(Self { frame_id, phone_number, data })
    }
}

/// `0x9F` RX SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxSms {
    /// Originating phone number, trimmed of trailing NULs.
    pub phone_number: String,
    /// Message body.
    pub data: String,
}

impl RxSms {
    pub(crate) const MIN_LEN: usize = 21;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) -> ParseResult<()> {
        out.push(0x00);
        out.extend_from_slice(&encode_phone_number(&self.phone_number)?);
        out.extend_from_slice(self.data.as_bytes());
        Ok(())
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        let phone_field: [u8; 20] = buf[1..21].try_into().unwrap_or_else(|_| unreachable!("slice of len 20"));
        let phone_number = decode_phone_number(&phone_field)?;
        let data = String::from_utf8(buf[21..].to_vec())
            .map_err(|_| ParseError::FieldConstraintViolation("SMS body must be UTF-8"))?;
        Ok(Self { phone_number, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_sms_round_trip() {
        let sms = TxSms {
            frame_id: 1,
            phone_number: "+15551234567".to_string(),
            data: "hello".to_string(),
        };
        let mut buf = Vec::new();
        sms.encode_fields(&mut buf).unwrap();
        assert_eq!(TxSms::parse_fields(&buf).unwrap(), sms);
    }

    #[test]
    fn phone_number_too_long_is_rejected() {
        let sms = TxSms {
            frame_id: 1,
            phone_number: "1".repeat(21),
            data: String::new(),
        };
        let mut buf = Vec::new();
        assert!(sms.encode_fields(&mut buf).is_err());
    }
}
