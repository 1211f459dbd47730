//! Transmit request and the correlated transmit-status indication.

use bytes::Bytes;

use crate::{
    address::{Address16, Address64},
    error::{ParseError, ParseResult},
};

/// `0x10` Transmit Request (standard, non-explicit addressing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    /// Frame ID correlating the eventual [`TransmitStatus`]. `0` disables
    /// correlation.
    pub frame_id: u8,
    /// 64-bit destination address ([`Address64::BROADCAST`] for broadcast).
    pub dest64: Address64,
    /// 16-bit destination address. Use [`Address16::UNKNOWN`] when not
    /// resolved.
    pub dest16: Address16,
    /// Maximum hops for a broadcast (`0` = use the network's maximum).
    pub broadcast_radius: u8,
    /// Transmit option bitfield, passed through uninterpreted.
    pub transmit_options: u8,
    /// Payload to transmit.
    pub rf_data: Bytes,
}

impl TransmitRequest {
    pub(crate) const MIN_LEN: usize = 13;

    /// Whether this request targets the broadcast address.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.dest64.is_broadcast() || self.dest16.is_broadcast()
    }

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.dest64.write(out);
        self.dest16.write(out);
        out.push(self.broadcast_radius);
        out.push(self.transmit_options);
        out.extend_from_slice(&self.rf_data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            frame_id: buf[0],
            dest64: Address64::read(&buf[1..9])?,
            dest16: Address16::read(&buf[9..11])?,
            broadcast_radius: buf[11],
            transmit_options: buf[12],
            rf_data: Bytes::copy_from_slice(&buf[13..]),
        })
    }
}

/// Delivery outcome carried by [`TransmitStatus`].
///
/// Unknown codes map to [`DeliveryStatus::Unknown`] rather than rejecting
/// the frame; firmware revisions add new codes routinely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryStatus {
    /// `0x00` delivered.
    Success,
    /// `0x01` MAC-layer acknowledgement not received.
    MacAckFailure,
    /// `0x02` clear-channel assessment / listen-before-talk failure.
    CcaFailure,
    /// `0x15` destination endpoint does not exist.
    InvalidDestinationEndpoint,
    /// `0x21` network-layer acknowledgement not received.
    NetworkAckFailure,
    /// `0x22` device is not joined to a network.
    NotJoinedToNetwork,
    /// `0x23` the destination was this device itself.
    SelfAddressed,
    /// `0x24` destination address could not be resolved.
    AddressNotFound,
    /// `0x25` no route to destination could be found.
    RouteNotFound,
    /// `0x74` payload too large for a single transmission.
    PayloadTooLarge,
    /// Any status code not otherwise enumerated.
    Unknown(u8),
}

impl DeliveryStatus {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Success,
            0x01 => Self::MacAckFailure,
            0x02 => Self::CcaFailure,
            0x15 => Self::InvalidDestinationEndpoint,
            0x21 => Self::NetworkAckFailure,
            0x22 => Self::NotJoinedToNetwork,
            0x23 => Self::SelfAddressed,
            0x24 => Self::AddressNotFound,
            0x25 => Self::RouteNotFound,
            0x74 => Self::PayloadTooLarge,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::MacAckFailure => 0x01,
            Self::CcaFailure => 0x02,
            Self::InvalidDestinationEndpoint => 0x15,
            Self::NetworkAckFailure => 0x21,
            Self::NotJoinedToNetwork => 0x22,
            Self::SelfAddressed => 0x23,
            Self::AddressNotFound => 0x24,
            Self::RouteNotFound => 0x25,
            Self::PayloadTooLarge => 0x74,
            Self::Unknown(b) => b,
        }
    }

    /// Whether the GPM rendezvous should treat this as a delivered frame
    /// (`Success` or `SelfAddressed`, per the transmit-status correlation
    /// rule).
    #[must_use]
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Success | Self::SelfAddressed)
    }
}

/// Route-discovery outcome carried by [`TransmitStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryStatus {
    /// `0x00` no discovery was needed.
    NoDiscoveryOverhead,
    /// `0x01` address discovery occurred.
    AddressDiscovery,
    /// `0x02` route discovery occurred.
    RouteDiscovery,
    /// `0x03` both address and route discovery occurred.
    AddressAndRouteDiscovery,
    /// Any status code not otherwise enumerated.
    Unknown(u8),
}

impl DiscoveryStatus {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::NoDiscoveryOverhead,
            0x01 => Self::AddressDiscovery,
            0x02 => Self::RouteDiscovery,
            0x03 => Self::AddressAndRouteDiscovery,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::NoDiscoveryOverhead => 0x00,
            Self::AddressDiscovery => 0x01,
            Self::RouteDiscovery => 0x02,
            Self::AddressAndRouteDiscovery => 0x03,
            Self::Unknown(b) => b,
        }
    }
}

/// `0x8B` Transmit Status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitStatus {
    /// Frame ID of the [`TransmitRequest`] this status correlates with.
    pub frame_id: u8,
    /// Destination 16-bit address as reported by the device.
    pub dest16: Address16,
    /// Number of MAC-layer retries performed.
    pub retry_count: u8,
    /// Delivery outcome.
    pub delivery_status: DeliveryStatus,
    /// Route-discovery outcome.
    pub discovery_status: DiscoveryStatus,
}

impl TransmitStatus {
    pub(crate) const MIN_LEN: usize = 6;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.dest16.write(out);
        out.push(self.retry_count);
        out.push(self.delivery_status.to_byte());
        out.push(self.discovery_status.to_byte());
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            frame_id: buf[0],
            dest16: Address16::read(&buf[1..3])?,
            retry_count: buf[3],
            delivery_status: DeliveryStatus::from_byte(buf[4]),
            discovery_status: DiscoveryStatus::from_byte(buf[5]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmit_status_scenario_from_spec() {
        // 8B 01 FF FE 00 00 00
        let buf = [0x01, 0xFF, 0xFE, 0x00, 0x00, 0x00];
        let status = TransmitStatus::parse_fields(&buf).unwrap();
        assert_eq!(status.frame_id, 0x01);
        assert_eq!(status.dest16, Address16([0xFF, 0xFE]));
        assert_eq!(status.retry_count, 0);
        assert_eq!(status.delivery_status, DeliveryStatus::Success);
        assert_eq!(status.discovery_status, DiscoveryStatus::NoDiscoveryOverhead);
    }

    #[test]
    fn unknown_status_codes_never_reject() {
        let buf = [0x01, 0xFF, 0xFE, 0x00, 0xEE, 0xEE];
        let status = TransmitStatus::parse_fields(&buf).unwrap();
        assert_eq!(status.delivery_status, DeliveryStatus::Unknown(0xEE));
        assert_eq!(status.discovery_status, DiscoveryStatus::Unknown(0xEE));
    }

    #[test]
    fn delivered_includes_self_addressed() {
        assert!(DeliveryStatus::Success.is_delivered());
        assert!(DeliveryStatus::SelfAddressed.is_delivered());
        assert!(!DeliveryStatus::MacAckFailure.is_delivered());
    }

    #[test]
    fn transmit_request_parses_with_empty_rf_data() {
        let buf = [0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFE, 0x00, 0x00];
        let request = TransmitRequest::parse_fields(&buf).unwrap();
        assert_eq!(request.frame_id, 0x01);
        assert_eq!(request.dest16, Address16([0xFF, 0xFE]));
        assert_eq!(request.broadcast_radius, 0x00);
        assert_eq!(request.transmit_options, 0x00);
        assert!(request.rf_data.is_empty());
    }

    #[test]
    fn transmit_request_exactly_at_min_len_is_not_truncated() {
        let buf = [0u8; TransmitRequest::MIN_LEN];
        assert!(TransmitRequest::parse_fields(&buf).is_ok());
    }

    #[test]
    fn transmit_request_one_byte_short_is_incomplete() {
        let buf = [0u8; TransmitRequest::MIN_LEN - 1];
        assert!(matches!(
            TransmitRequest::parse_fields(&buf),
            Err(ParseError::IncompletePayload { expected: TransmitRequest::MIN_LEN, .. })
        ));
    }
}
