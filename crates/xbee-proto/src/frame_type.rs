//! Frame-type identifier: the single byte that both discriminates the frame
//! taxonomy and is the first byte on the wire.

use crate::error::ParseError;

/// Stable frame-type identifiers (selected, not exhaustive of the legacy
/// series-1 ids the queue's address-match rules also recognize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FrameType {
    /// `0x08` AT Command (local)
    AtCommand,
    /// `0x09` AT Command (queued, applied on next `AC`/commit)
    AtCommandQueued,
    /// `0x10` Transmit Request
    TransmitRequest,
    /// `0x11` Explicit Addressing Request
    ExplicitAddressingRequest,
    /// `0x17` Remote AT Command
    RemoteAtCommand,
    /// `0x1F` TX SMS
    TxSms,
    /// `0x2C` Bluetooth Unlock Request
    BluetoothUnlock,
    /// `0x2D` User Data Relay (input)
    UserDataRelayInput,
    /// `0x80` RX64 (legacy series-1 receive)
    Rx64,
    /// `0x81` RX16 (legacy series-1 receive)
    Rx16,
    /// `0x82` RX64 IO (legacy series-1 IO sample)
    Rx64Io,
    /// `0x83` RX16 IO (legacy series-1 IO sample)
    Rx16Io,
    /// `0x88` AT Command Response
    AtCommandResponse,
    /// `0x8A` Modem Status
    ModemStatus,
    /// `0x8B` Transmit Status
    TransmitStatus,
    /// `0x90` Receive Indicator
    Receive,
    /// `0x91` Explicit RX Indicator
    ExplicitRxIndicator,
    /// `0x92` IO Data Sample RX Indicator
    IoDataSample,
    /// `0x97` Remote AT Command Response
    RemoteAtCommandResponse,
    /// `0x9F` RX SMS
    RxSms,
    /// `0xA0` TX IPv4
    TxIpv4,
    /// `0xA1` RX IPv4
    RxIpv4,
    /// `0xAC` Bluetooth Unlock Response
    BluetoothUnlockResponse,
    /// `0xAD` User Data Relay (output)
    UserDataRelayOutput,
}

impl FrameType {
    /// Raw identifier byte, as it appears first on the wire.
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::AtCommand => 0x08,
            Self::AtCommandQueued => 0x09,
            Self::TransmitRequest => 0x10,
            Self::ExplicitAddressingRequest => 0x11,
            Self::RemoteAtCommand => 0x17,
            Self::TxSms => 0x1F,
            Self::BluetoothUnlock => 0x2C,
            Self::UserDataRelayInput => 0x2D,
            Self::Rx64 => 0x80,
            Self::Rx16 => 0x81,
            Self::Rx64Io => 0x82,
            Self::Rx16Io => 0x83,
            Self::AtCommandResponse => 0x88,
            Self::ModemStatus => 0x8A,
            Self::TransmitStatus => 0x8B,
            Self::Receive => 0x90,
            Self::ExplicitRxIndicator => 0x91,
            Self::IoDataSample => 0x92,
            Self::RemoteAtCommandResponse => 0x97,
            Self::RxSms => 0x9F,
            Self::TxIpv4 => 0xA0,
            Self::RxIpv4 => 0xA1,
            Self::BluetoothUnlockResponse => 0xAC,
            Self::UserDataRelayOutput => 0xAD,
        }
    }

    /// Map a wire byte back to its variant.
    ///
    /// # Errors
    ///
    /// `ParseError::UnknownFrameType` if `id` matches no recognized variant.
    pub const fn from_id(id: u8) -> Result<Self, ParseError> {
        match id {
            0x08 => Ok(Self::AtCommand),
            0x09 => Ok(Self::AtCommandQueued),
            0x10 => Ok(Self::TransmitRequest),
            0x11 => Ok(Self::ExplicitAddressingRequest),
            0x17 => Ok(Self::RemoteAtCommand),
            0x1F => Ok(Self::TxSms),
            0x2C => Ok(Self::BluetoothUnlock),
            0x2D => Ok(Self::UserDataRelayInput),
            0x80 => Ok(Self::Rx64),
            0x81 => Ok(Self::Rx16),
            0x82 => Ok(Self::Rx64Io),
            0x83 => Ok(Self::Rx16Io),
            0x88 => Ok(Self::AtCommandResponse),
            0x8A => Ok(Self::ModemStatus),
            0x8B => Ok(Self::TransmitStatus),
            0x90 => Ok(Self::Receive),
            0x91 => Ok(Self::ExplicitRxIndicator),
            0x92 => Ok(Self::IoDataSample),
            0x97 => Ok(Self::RemoteAtCommandResponse),
            0x9F => Ok(Self::RxSms),
            0xA0 => Ok(Self::TxIpv4),
            0xA1 => Ok(Self::RxIpv4),
            0xAC => Ok(Self::BluetoothUnlockResponse),
            0xAD => Ok(Self::UserDataRelayOutput),
            other => Err(ParseError::UnknownFrameType(other)),
        }
    }

    /// Whether frames of this type carry a frame-ID byte expecting a
    /// correlated response. Pure indications (the device telling us
    /// something unsolicited) never do.
    #[must_use]
    pub const fn carries_frame_id(self) -> bool {
        !matches!(
            self,
            Self::ModemStatus
                | Self::Receive
                | Self::ExplicitRxIndicator
                | Self::IoDataSample
                | Self::RxSms
                | Self::RxIpv4
                | Self::UserDataRelayOutput
                | Self::Rx64
                | Self::Rx16
                | Self::Rx64Io
                | Self::Rx16Io
                | Self::BluetoothUnlockResponse
        )
    }

    /// Short human-readable name, exhaustively matched so a new variant
    /// fails to compile without a description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AtCommand => "AT Command",
            Self::AtCommandQueued => "AT Command (Queued)",
            Self::TransmitRequest => "Transmit Request",
            Self::ExplicitAddressingRequest => "Explicit Addressing Request",
            Self::RemoteAtCommand => "Remote AT Command",
            Self::TxSms => "TX SMS",
            Self::BluetoothUnlock => "Bluetooth Unlock Request",
            Self::UserDataRelayInput => "User Data Relay (input)",
            Self::Rx64 => "RX64 (legacy)",
            Self::Rx16 => "RX16 (legacy)",
            Self::Rx64Io => "RX64 IO (legacy)",
            Self::Rx16Io => "RX16 IO (legacy)",
            Self::AtCommandResponse => "AT Command Response",
            Self::ModemStatus => "Modem Status",
            Self::TransmitStatus => "Transmit Status",
            Self::Receive => "Receive Indicator",
            Self::ExplicitRxIndicator => "Explicit RX Indicator",
            Self::IoDataSample => "IO Data Sample RX Indicator",
            Self::RemoteAtCommandResponse => "Remote AT Command Response",
            Self::RxSms => "RX SMS",
            Self::TxIpv4 => "TX IPv4",
            Self::RxIpv4 => "RX IPv4",
            Self::BluetoothUnlockResponse => "Bluetooth Unlock Response",
            Self::UserDataRelayOutput => "User Data Relay (output)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip() {
        for ft in [
            FrameType::AtCommand,
            FrameType::TransmitRequest,
            FrameType::ExplicitAddressingRequest,
            FrameType::BluetoothUnlock,
            FrameType::BluetoothUnlockResponse,
            FrameType::RxIpv4,
        ] {
            assert_eq!(FrameType::from_id(ft.id()).unwrap(), ft);
        }
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_eq!(FrameType::from_id(0xFF), Err(ParseError::UnknownFrameType(0xFF)));
    }
}
