//! Explicit addressing request and the corresponding receive indicator.
//!
//! These frames add application-layer source/destination endpoints and a
//! cluster/profile ID pair on top of the radio addresses, and are what the
//! GPM update sequencer (C5) uses for its reserved cluster/profile.

use bytes::Bytes;

use crate::{
    address::{Address16, Address64, ClusterId, Endpoint, ProfileId},
    error::{ParseError, ParseResult},
};

/// `0x11` Explicit Addressing Request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitAddressingRequest {
    /// Frame ID correlating the eventual [`TransmitStatus`](super::transmit::TransmitStatus).
    /// `0` disables correlation.
    pub frame_id: u8,
    /// 64-bit destination address.
    pub dest64: Address64,
    /// 16-bit destination address.
    pub dest16: Address16,
    /// Source application endpoint.
    pub source_endpoint: Endpoint,
    /// Destination application endpoint.
    pub dest_endpoint: Endpoint,
    /// Application cluster ID.
    pub cluster_id: ClusterId,
    /// Application profile ID.
    pub profile_id: ProfileId,
    /// Maximum hops for a broadcast.
    pub broadcast_radius: u8,
    /// Transmit option bitfield, passed through uninterpreted.
    pub transmit_options: u8,
    /// Command/application data.
    pub rf_data: Bytes,
}

impl ExplicitAddressingRequest {
    pub(crate) const MIN_LEN: usize = 19;

    /// Whether this request targets the broadcast address.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.dest64.is_broadcast() || self.dest16.is_broadcast()
    }

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        self.dest64.write(out);
        self.dest16.write(out);
        out.push(self.source_endpoint.0);
        out.push(self.dest_endpoint.0);
        self.cluster_id.write(out);
        self.profile_id.write(out);
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
            source_endpoint: Endpoint(buf[11]),
            dest_endpoint: Endpoint(buf[12]),
            cluster_id: ClusterId::read(&buf[13..15])?,
            profile_id: ProfileId::read(&buf[15..17])?,
            broadcast_radius: buf[17],
            transmit_options: buf[18],
            rf_data: Bytes::copy_from_slice(&buf[19..]),
        })
    }
}

/// `0x91` Explicit RX Indicator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRxIndicator {
    /// 64-bit source address.
    pub source64: Address64,
    /// 16-bit source address.
    pub source16: Address16,
    /// Source application endpoint.
    pub source_endpoint: Endpoint,
    /// Destination application endpoint.
    pub dest_endpoint: Endpoint,
    /// Application cluster ID.
    pub cluster_id: ClusterId,
    /// Application profile ID.
    pub profile_id: ProfileId,
    /// Receive option bitfield.
    pub receive_options: super::receive::ReceiveOptions,
    /// Received application data.
    pub rf_data: Bytes,
}

impl ExplicitRxIndicator {
    pub(crate) const MIN_LEN: usize = 17;

    /// Whether this indicator was a broadcast.
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        self.receive_options.is_broadcast()
    }

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        self.source64.write(out);
        self.source16.write(out);
        out.push(self.source_endpoint.0);
        out.push(self.dest_endpoint.0);
        self.cluster_id.write(out);
        self.profile_id.write(out);
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
            source_endpoint: Endpoint(buf[10]),
            dest_endpoint: Endpoint(buf[11]),
            cluster_id: ClusterId::read(&buf[12..14])?,
            profile_id: ProfileId::read(&buf[14..16])?,
            receive_options: super::receive::ReceiveOptions(buf[16]),
            rf_data: Bytes::copy_from_slice(&buf[17..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_addressing_serialize_scenario_from_spec() {
        let req = ExplicitAddressingRequest {
            frame_id: 1,
            dest64: Address64([0x00, 0x13, 0xA2, 0x00, 0x40, 0xAA, 0xBB, 0xCC]),
            dest16: Address16([0xFF, 0xFE]),
            source_endpoint: Endpoint(0xE6),
            dest_endpoint: Endpoint(0xE6),
            cluster_id: ClusterId([0x00, 0x23]),
            profile_id: ProfileId([0xC1, 0x05]),
            broadcast_radius: 0,
            transmit_options: 0,
            rf_data: Bytes::from_static(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        };
        let mut buf = vec![0x11];
        req.encode_fields(&mut buf);
        assert_eq!(
            &buf[..19],
            &[
                0x11, 0x01, 0x00, 0x13, 0xA2, 0x00, 0x40, 0xAA, 0xBB, 0xCC, 0xFF, 0xFE, 0xE6,
                0xE6, 0x00, 0x23, 0xC1, 0x05, 0x00,
            ]
        );
    }
}
