//! Error types for the packet queue and the two sequencers.
//!
//! Each layer gets its own `thiserror` enum rather than one flat type
//! spanning the whole crate — a caller handling a queue timeout should not
//! have to match on GPM write-retry exhaustion. `SessionError` in
//! `xbee-client` composes these with `#[from]` for callers who want one
//! error type at the top.

use std::time::Duration;

use thiserror::Error;
use xbee_proto::frames::bluetooth::SrpPhase;

use crate::srp::SrpPhaseKind;

/// Errors from [`crate::queue::PacketQueue`] retrieval.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// No matching frame arrived before the caller's timeout elapsed.
    #[error("timed out after {0:?} waiting for a matching frame")]
    Timeout(Duration),
}

/// Errors from [`crate::srp::SrpSequencer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrpError {
    /// No response arrived within the phase's timeout.
    #[error("SRP phase {phase:?} timed out after {elapsed:?}")]
    PhaseTimeout {
        /// The phase that timed out.
        phase: SrpPhaseKind,
        /// How long the sequencer waited.
        elapsed: Duration,
    },

    /// The device reported an SRP error code instead of continuing the
    /// handshake.
    #[error("device rejected the handshake: error code {0:#04x}")]
    DeviceRejected(u8),

    /// A response arrived whose phase did not match the phase the sequencer
    /// was waiting for.
    #[error("out of sequence: expected phase {expected:?}, device sent {found:?}")]
    OutOfSequence {
        /// The phase the sequencer was waiting for.
        expected: SrpPhaseKind,
        /// The phase actually carried by the device's response.
        found: SrpPhase,
    },

    /// The cryptographic proof exchange itself failed (bad password, or a
    /// malformed reply from the device).
    #[error(transparent)]
    Crypto(#[from] xbee_crypto::SrpError),
}

/// A single GPM update step, used to label which step a [`GpmError`]
/// occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpmStep {
    /// Querying the platform's block count and block size.
    Info,
    /// Erasing flash before the write pass.
    Erase,
    /// Writing one page of the firmware image.
    Write,
    /// Verifying the written image.
    Verify,
    /// Verifying and installing the image.
    VerifyInstall,
}

/// Errors from [`crate::gpm::GpmSequencer`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpmError {
    /// A request was sent but no transmit-status frame acknowledged it
    /// within the step's timeout.
    #[error("no transmit-status for the {0:?} request")]
    TxStatusAbsent(GpmStep),

    /// A request was sent but no correlated explicit-receive-indicator
    /// response arrived within the step's timeout.
    #[error("no response to the {0:?} request within {1:?}")]
    RxTimeout(GpmStep, Duration),

    /// The response payload was too short or carried the wrong command
    /// byte.
    #[error("malformed {0:?} response")]
    ResponseMalformed(GpmStep),

    /// The device's response status byte indicated failure.
    #[error("device reported failure at the {0:?} step")]
    DeviceError(GpmStep),

    /// A page write failed 3 times in a row.
    #[error("write retries exhausted at block {block}, offset {offset}")]
    WriteRetriesExhausted {
        /// The GPM block index being written.
        block: u32,
        /// The byte offset within that block.
        offset: u32,
    },

    /// The device never announced a hardware reset after install.
    #[error("device did not reboot within {0:?} of a successful install")]
    NoModemReset(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srp_crypto_errors_convert() {
        let err: SrpError = xbee_crypto::SrpError::ServerVerificationFailed.into();
        assert!(matches!(err, SrpError::Crypto(_)));
    }

    #[test]
    fn gpm_error_messages_name_the_step() {
        let err = GpmError::WriteRetriesExhausted { block: 3, offset: 128 };
        assert!(err.to_string().contains("block 3"));
    }
}
