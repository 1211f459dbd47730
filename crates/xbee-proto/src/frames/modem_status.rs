//! Modem status indication: unsolicited device/network state changes.

use crate::error::{ParseError, ParseResult};

/// Event code carried by a [`ModemStatus`] frame.
///
/// Unknown codes map to [`ModemStatusEvent::Unknown`] rather than rejecting
/// the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModemStatusEvent {
    /// `0x00` device completed a hardware or watchdog reset.
    HardwareReset,
    /// `0x01` device completed a watchdog-timer reset.
    WatchdogTimerReset,
    /// `0x02` device joined a network.
    Joined,
    /// `0x03` device disassociated from a network.
    Disassociated,
    /// `0x06` coordinator started.
    CoordinatorStarted,
    /// `0x0D` voltage supply limit exceeded.
    VoltageSupplyLimitExceeded,
    /// `0x11` modem configuration changed while join was in progress.
    ModemConfigChangedWhileJoining,
    /// Any event code not otherwise enumerated.
    Unknown(u8),
}

impl ModemStatusEvent {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::HardwareReset,
            0x01 => Self::WatchdogTimerReset,
            0x02 => Self::Joined,
            0x03 => Self::Disassociated,
            0x06 => Self::CoordinatorStarted,
            0x0D => Self::VoltageSupplyLimitExceeded,
            0x11 => Self::ModemConfigChangedWhileJoining,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::HardwareReset => 0x00,
            Self::WatchdogTimerReset => 0x01,
            Self::Joined => 0x02,
            Self::Disassociated => 0x03,
            Self::CoordinatorStarted => 0x06,
            Self::VoltageSupplyLimitExceeded => 0x0D,
            Self::ModemConfigChangedWhileJoining => 0x11,
            Self::Unknown(b) => b,
        }
    }

    /// Whether this event indicates the device just rebooted, the signal
    /// the GPM update sequencer's install phase waits for.
    #[must_use]
    pub fn is_reboot(self) -> bool {
        matches!(self, Self::HardwareReset | Self::WatchdogTimerReset)
    }
}

/// `0x8A` Modem Status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemStatus {
    /// The event that occurred.
    pub event: ModemStatusEvent,
}

impl ModemStatus {
    pub(crate) const MIN_LEN: usize = 1;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.event.to_byte());
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self { event: ModemStatusEvent::from_byte(buf[0]) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_reset_is_a_reboot() {
        assert!(ModemStatusEvent::HardwareReset.is_reboot());
        assert!(ModemStatusEvent::WatchdogTimerReset.is_reboot());
        assert!(!ModemStatusEvent::Joined.is_reboot());
    }

    #[test]
    fn unknown_event_code_round_trips() {
        let status = ModemStatus { event: ModemStatusEvent::Unknown(0xEE) };
        let mut buf = Vec::new();
        status.encode_fields(&mut buf);
        assert_eq!(ModemStatus::parse_fields(&buf).unwrap(), status);
    }
}
