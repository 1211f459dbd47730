//! The frame taxonomy: one variant per API frame type, plus the top-level
//! [`Frame::serialize`]/[`Frame::parse`] pair that make up the C1 contract.

pub mod at;
pub mod bluetooth;
pub mod explicit;
pub mod io_sample;
pub mod ipv4;
pub mod modem_status;
pub mod receive;
pub mod relay;
pub mod sms;
pub mod transmit;

use bytes::{BufMut, Bytes};

use crate::{error::ParseResult, frame_type::FrameType};

use at::{AtCommandQueuedRequest, AtCommandRequest, AtCommandResponse, RemoteAtCommandRequest, RemoteAtCommandResponse};
use bluetooth::{BluetoothUnlockRequest, BluetoothUnlockResponse};
use explicit::{ExplicitAddressingRequest, ExplicitRxIndicator};
use io_sample::{IoDataSample, Rx16Io, Rx64Io};
use ipv4::{RxIpv4, TxIpv4};
use modem_status::ModemStatus;
use receive::{Receive, Rx16, Rx64};
use relay::{UserDataRelayInput, UserDataRelayOutput};
use sms::{RxSms, TxSms};
use transmit::{TransmitRequest, TransmitStatus};

/// A fully decoded API frame: a typed payload paired with its [`FrameType`].
///
/// `Frame::parse` is the inverse of `Frame::serialize`, modulo unknown
/// frame-type identifiers, which `parse` rejects and `serialize` cannot
/// produce (every variant here maps to a known identifier).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Frame {
    /// `0x08`
    AtCommand(AtCommandRequest),
    /// `0x09`
    AtCommandQueued(AtCommandQueuedRequest),
    /// `0x10`
    TransmitRequest(TransmitRequest),
    /// `0x11`
    ExplicitAddressingRequest(ExplicitAddressingRequest),
    /// `0x17`
    RemoteAtCommand(RemoteAtCommandRequest),
    /// `0x1F`
    TxSms(TxSms),
    /// `0x2C`
    BluetoothUnlock(BluetoothUnlockRequest),
    /// `0x2D`
    UserDataRelayInput(UserDataRelayInput),
    /// `0x80`
    Rx64(Rx64),
    /// `0x81`
    Rx16(Rx16),
    /// `0x82`
    Rx64Io(Rx64Io),
    /// `0x83`
    Rx16Io(Rx16Io),
    /// `0x88`
    AtCommandResponse(AtCommandResponse),
    /// `0x8A`
    ModemStatus(ModemStatus),
    /// `0x8B`
    TransmitStatus(TransmitStatus),
    /// `0x90`
    Receive(Receive),
    /// `0x91`
    ExplicitRxIndicator(ExplicitRxIndicator),
    /// `0x92`
    IoDataSample(IoDataSample),
    /// `0x97`
    RemoteAtCommandResponse(RemoteAtCommandResponse),
    /// `0x9F`
    RxSms(RxSms),
    /// `0xA0`
    TxIpv4(TxIpv4),
    /// `0xA1`
    RxIpv4(RxIpv4),
    /// `0xAC`
    BluetoothUnlockResponse(BluetoothUnlockResponse),
    /// `0xAD`
    UserDataRelayOutput(UserDataRelayOutput),
}

impl Frame {
    /// The frame-type identifier this frame serializes under.
    #[must_use]
    pub fn frame_type(&self) -> FrameType {
        match self {
            Self::AtCommand(_) => FrameType::AtCommand,
            Self::AtCommandQueued(_) => FrameType::AtCommandQueued,
            Self::TransmitRequest(_) => FrameType::TransmitRequest,
            Self::ExplicitAddressingRequest(_) => FrameType::ExplicitAddressingRequest,
            Self::RemoteAtCommand(_) => FrameType::RemoteAtCommand,
            Self::TxSms(_) => FrameType::TxSms,
            Self::BluetoothUnlock(_) => FrameType::BluetoothUnlock,
            Self::UserDataRelayInput(_) => FrameType::UserDataRelayInput,
            Self::Rx64(_) => FrameType::Rx64,
            Self::Rx16(_) => FrameType::Rx16,
            Self::Rx64Io(_) => FrameType::Rx64Io,
            Self::Rx16Io(_) => FrameType::Rx16Io,
            Self::AtCommandResponse(_) => FrameType::AtCommandResponse,
            Self::ModemStatus(_) => FrameType::ModemStatus,
            Self::TransmitStatus(_) => FrameType::TransmitStatus,
            Self::Receive(_) => FrameType::Receive,
            Self::ExplicitRxIndicator(_) => FrameType::ExplicitRxIndicator,
            Self::IoDataSample(_) => FrameType::IoDataSample,
            Self::RemoteAtCommandResponse(_) => FrameType::RemoteAtCommandResponse,
            Self::RxSms(_) => FrameType::RxSms,
            Self::TxIpv4(_) => FrameType::TxIpv4,
            Self::RxIpv4(_) => FrameType::RxIpv4,
            Self::BluetoothUnlockResponse(_) => FrameType::BluetoothUnlockResponse,
            Self::UserDataRelayOutput(_) => FrameType::UserDataRelayOutput,
        }
    }

    /// Serialize this frame's payload: the frame-type byte followed by its
    /// type-specific fields. This is the payload that [`crate::wire`] wraps
    /// in the delimiter/length/checksum envelope; it is infallible because a
    /// constructed `Frame` value is always well-formed.
    #[must_use]
    pub fn serialize(&self) -> Bytes {
        let mut out = Vec::new();
        out.put_u8(self.frame_type().id());
        match self {
            Self::AtCommand(f) => f.encode_fields(&mut out),
            Self::AtCommandQueued(f) => f.encode_fields(&mut out),
            Self::TransmitRequest(f) => f.encode_fields(&mut out),
            Self::ExplicitAddressingRequest(f) => f.encode_fields(&mut out),
            Self::RemoteAtCommand(f) => f.encode_fields(&mut out),
            Self::TxSms(f) => f
                .encode_fields(&mut out)
                .unwrap_or_else(|_| unreachable!("phone number length was validated at construction")),
            Self::BluetoothUnlock(f) => f.encode_fields(&mut out),
            Self::UserDataRelayInput(f) => f.encode_fields(&mut out),
            Self::Rx64(f) => f.encode_fields(&mut out),
            Self::Rx16(f) => f.encode_fields(&mut out),
            Self::Rx64Io(f) => f.encode_fields(&mut out),
            Self::Rx16Io(f) => f.encode_fields(&mut out),
            Self::AtCommandResponse(f) => f.encode_fields(&mut out),
            Self::ModemStatus(f) => f.encode_fields(&mut out),
            Self::TransmitStatus(f) => f.encode_fields(&mut out),
            Self::Receive(f) => f.encode_fields(&mut out),
            Self::ExplicitRxIndicator(f) => f.encode_fields(&mut out),
            Self::IoDataSample(f) => f.encode_fields(&mut out),
            Self::RemoteAtCommandResponse(f) => f.encode_fields(&mut out),
            Self::RxSms(f) => f
                .encode_fields(&mut out)
                .unwrap_or_else(|_| unreachable!("phone number length was validated at construction")),
            Self::TxIpv4(f) => f.encode_fields(&mut out),
            Self::RxIpv4(f) => f.encode_fields(&mut out),
            Self::BluetoothUnlockResponse(f) => f.encode_fields(&mut out),
            Self::UserDataRelayOutput(f) => f.encode_fields(&mut out),
        }
        Bytes::from(out)
    }

    /// Parse a frame payload (frame-type byte plus fields, no wire envelope).
    ///
    /// # Errors
    ///
    /// `ParseError::UnknownFrameType` if the leading byte matches no
    /// recognized variant; `ParseError::IncompletePayload` or
    /// `ParseError::FieldConstraintViolation` if the fields violate the
    /// variant's constraints.
    pub fn parse(payload: &[u8]) -> ParseResult<Self> {
        let (&type_byte, fields) = payload
            .split_first()
            .ok_or(crate::error::ParseError::IncompletePayload { expected: 1, actual: 0 })?;
        let frame_type = FrameType::from_id(type_byte)?;
        Ok(match frame_type {
            FrameType::AtCommand => Self::AtCommand(AtCommandRequest::parse_fields(fields)?),
            FrameType::AtCommandQueued => Self::AtCommandQueued(AtCommandQueuedRequest::parse_fields(fields)?),
            FrameType::TransmitRequest => Self::TransmitRequest(TransmitRequest::parse_fields(fields)?),
            FrameType::ExplicitAddressingRequest => {
                Self::ExplicitAddressingRequest(ExplicitAddressingRequest::parse_fields(fields)?)
            }
            FrameType::RemoteAtCommand => Self::RemoteAtCommand(RemoteAtCommandRequest::parse_fields(fields)?),
            FrameType::TxSms => Self::TxSms(TxSms::parse_fields(fields)?),
            FrameType::BluetoothUnlock => Self::BluetoothUnlock(BluetoothUnlockRequest::parse_fields(fields)?),
            FrameType::UserDataRelayInput => Self::UserDataRelayInput(UserDataRelayInput::parse_fields(fields)?),
            FrameType::Rx64 => Self::Rx64(Rx64::parse_fields(fields)?),
            FrameType::Rx16 => Self::Rx16(Rx16::parse_fields(fields)?),
            FrameType::Rx64Io => Self::Rx64Io(Rx64Io::parse_fields(fields)?),
            FrameType::Rx16Io => Self::Rx16Io(Rx16Io::parse_fields(fields)?),
            FrameType::AtCommandResponse => Self::AtCommandResponse(AtCommandResponse::parse_fields(fields)?),
            FrameType::ModemStatus => Self::ModemStatus(ModemStatus::parse_fields(fields)?),
            FrameType::TransmitStatus => Self::TransmitStatus(TransmitStatus::parse_fields(fields)?),
            FrameType::Receive => Self::Receive(Receive::parse_fields(fields)?),
            FrameType::ExplicitRxIndicator => Self::ExplicitRxIndicator(ExplicitRxIndicator::parse_fields(fields)?),
            FrameType::IoDataSample => Self::IoDataSample(IoDataSample::parse_fields(fields)?),
            FrameType::RemoteAtCommandResponse => {
                Self::RemoteAtCommandResponse(RemoteAtCommandResponse::parse_fields(fields)?)
            }
            FrameType::RxSms => Self::RxSms(RxSms::parse_fields(fields)?),
            FrameType::TxIpv4 => Self::TxIpv4(TxIpv4::parse_fields(fields)?),
            FrameType::RxIpv4 => Self::RxIpv4(RxIpv4::parse_fields(fields)?),
            FrameType::BluetoothUnlockResponse => {
                Self::BluetoothUnlockResponse(BluetoothUnlockResponse::parse_fields(fields)?)
            }
            FrameType::UserDataRelayOutput => Self::UserDataRelayOutput(UserDataRelayOutput::parse_fields(fields)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address16, Address64};

    #[test]
    fn transmit_status_round_trips_through_frame() {
        let frame = Frame::TransmitStatus(TransmitStatus {
            frame_id: 1,
            dest16: Address16([0xFF, 0xFE]),
            retry_count: 0,
            delivery_status: transmit::DeliveryStatus::Success,
            discovery_status: transmit::DiscoveryStatus::NoDiscoveryOverhead,
        });
        let bytes = frame.serialize();
        assert_eq!(bytes[0], 0x8B);
        assert_eq!(Frame::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn receive_round_trips_through_frame() {
        let frame = Frame::Receive(Receive {
            source64: Address64([0, 0x13, 0xA2, 0, 0x40, 0xAA, 0xBB, 0xCC]),
            source16: Address16([0xFF, 0xFE]),
            receive_options: receive::ReceiveOptions(0x02),
            rf_data: Bytes::from_static(b"hello"),
        });
        assert_eq!(Frame::parse(&frame.serialize()).unwrap(), frame);
    }

    #[test]
    fn unknown_frame_type_is_rejected() {
        assert!(Frame::parse(&[0xFF, 0x00]).is_err());
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(Frame::parse(&[]).is_err());
    }
}
