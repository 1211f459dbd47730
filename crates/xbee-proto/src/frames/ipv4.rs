//! IPv4 send/receive frames. The core parses these but never opens sockets
//! itself; that is left to a collaborator.

use bytes::Bytes;

use crate::error::{ParseError, ParseResult};

/// Transport-layer protocol carried by an IPv4 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpProtocol {
    /// `0x00` UDP.
    Udp,
    /// `0x01` TCP.
    Tcp,
    /// `0x04` SSL over TCP.
    SslOverTcp,
    /// Any protocol byte not otherwise enumerated.
    Unknown(u8),
}

impl IpProtocol {
    fn from_byte(b: u8) -> Self {
        match b {
            0x00 => Self::Udp,
            0x01 => Self::Tcp,
            0x04 => Self::SslOverTcp,
            other => Self::Unknown(other),
        }
    }

    fn to_byte(self) -> u8 {
        match self {
            Self::Udp => 0x00,
            Self::Tcp => 0x01,
            Self::SslOverTcp => 0x04,
            Self::Unknown(b) => b,
        }
    }
}

/// `0xA0` TX IPv4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIpv4 {
    /// Frame ID correlating the eventual transmit status. `0` disables
    /// correlation.
    pub frame_id: u8,
    /// Destination IPv4 address.
    pub dest_ip: [u8; 4],
    /// Destination port.
    pub dest_port: u16,
    /// Source port.
    pub source_port: u16,
    /// Transport-layer protocol.
    pub protocol: IpProtocol,
    /// Transmit option bitfield, passed through uninterpreted.
    pub options: u8,
    /// Payload to transmit.
    pub data: Bytes,
}

impl TxIpv4 {
    pub(crate) const MIN_LEN: usize = 11;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.push(self.frame_id);
        out.extend_from_slice(&self.dest_ip);
        out.extend_from_slice(&self.dest_port.to_be_bytes());
        out.extend_from_slice(&self.source_port.to_be_bytes());
        out.push(self.protocol.to_byte());
        out.push(self.options);
        out.extend_from_slice(&self.data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            frame_id: buf[0],
            dest_ip: buf[1..5].try_into().unwrap_or_else(|_| unreachable!("slice of len 4")),
            dest_port: u16::from_be_bytes([buf[5], buf[6]]),
            source_port: u16::from_be_bytes([buf[7], buf[8]]),
            protocol: IpProtocol::from_byte(buf[9]),
            options: buf[10],
            data: Bytes::copy_from_slice(&buf[11..]),
        })
    }
}

/// `0xA1` RX IPv4.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxIpv4 {
    /// Source IPv4 address, used by the queue's `*_from` address match.
    pub source_ip: [u8; 4],
    /// Destination port.
    pub dest_port: u16,
    /// Source port.
    pub source_port: u16,
    /// Transport-layer protocol.
    pub protocol: IpProtocol,
    /// Device-reported status byte, passed through uninterpreted.
    pub status: u8,
    /// Received payload.
    pub data: Bytes,
}

impl RxIpv4 {
    pub(crate) const MIN_LEN: usize = 10;

    pub(crate) fn encode_fields(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.dest_port.to_be_bytes());
        out.extend_from_slice(&self.source_port.to_be_bytes());
        out.extend_from_slice(&self.source_ip);
        out.push(self.protocol.to_byte());
        out.push(self.status);
        out.extend_from_slice(&self.data);
    }

    pub(crate) fn parse_fields(buf: &[u8]) -> ParseResult<Self> {
        if buf.len() < Self::MIN_LEN {
            return Err(ParseError::IncompletePayload { expected: Self::MIN_LEN, actual: buf.len() });
        }
        Ok(Self {
            dest_port: u16::from_be_bytes([buf[0], buf[1]]),
            source_port: u16::from_be_bytes([buf[2], buf[3]]),
            source_ip: buf[4..8].try_into().unwrap_or_else(|_| unreachable!("slice of len 4")),
            protocol: IpProtocol::from_byte(buf[8]),
            status: buf[9],
            data: Bytes::copy_from_slice(&buf[10..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_ipv4_round_trip() {
        let tx = TxIpv4 {
            frame_id: 1,
            dest_ip: [192, 168, 1, 1],
            dest_port: 4660,
            source_port: 2,
            protocol: IpProtocol::Udp,
            options: 0,
            data: Bytes::from_static(b"ping"),
        };
        let mut buf = Vec::new();
        tx.encode_fields(&mut buf);
        assert_eq!(TxIpv4::parse_fields(&buf).unwrap(), tx);
    }

    #[test]
    fn rx_ipv4_source_ip_used_for_matching() {
        let rx = RxIpv4 {
            source_ip: [10, 0, 0, 5],
            dest_port: 80,
            source_port: 1234,
            protocol: IpProtocol::Tcp,
            status: 0,
            data: Bytes::new(),
        };
        let mut buf = Vec::new();
        rx.encode_fields(&mut buf);
        assert_eq!(RxIpv4::parse_fields(&buf).unwrap().source_ip, [10, 0, 0, 5]);
    }
}
