//! The session façade's composed error type.

use std::io;

use thiserror::Error;
use xbee_core::{GpmError, QueueError, SrpError};
use xbee_proto::error::FrameError;

/// Errors a [`crate::Session`] can report.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The underlying [`crate::transport::DuplexChannel`] failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The wire framer rejected a received frame (bad checksum, truncated
    /// stream). Sync-loss is handled internally by the read loop and never
    /// surfaces here.
    #[error("wire framing error: {0}")]
    Wire(#[from] FrameError),

    /// A parsed frame carried a field the codec rejected.
    #[error("frame parse error: {0}")]
    Parse(#[from] xbee_proto::error::ParseError),

    /// A [`xbee_core::queue::PacketQueue`] retrieval timed out.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// The Bluetooth unlock handshake failed.
    #[error(transparent)]
    Srp(#[from] SrpError),

    /// The GPM firmware update failed.
    #[error(transparent)]
    Gpm(#[from] GpmError),

    /// A sequencer reached a state its own type shouldn't allow. Indicates a
    /// bug in the sequencer, not a device or transport failure.
    #[error("protocol invariant violated: {0}")]
    Protocol(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_errors_convert() {
        let err: SessionError = QueueError::Timeout(std::time::Duration::from_secs(1)).into();
        assert!(matches!(err, SessionError::Queue(_)));
    }
}
