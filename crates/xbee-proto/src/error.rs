//! Error types for frame parsing and wire framing.

use thiserror::Error;

/// Errors that can occur while parsing a frame payload into a typed [`crate::Frame`].
///
/// Serialization is infallible given a validly constructed frame value; only
/// parsing untrusted bytes can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Payload is shorter than the variant's fixed minimum length.
    #[error("incomplete payload: need at least {expected} bytes, got {actual}")]
    IncompletePayload {
        /// Minimum length required by the variant.
        expected: usize,
        /// Actual number of bytes available.
        actual: usize,
    },

    /// The leading frame-type byte does not map to any recognized variant.
    #[error("unknown frame type: {0:#04x}")]
    UnknownFrameType(u8),

    /// A field violates a variant-specific constraint (bad length, illegal
    /// value, etc).
    #[error("field constraint violation: {0}")]
    FieldConstraintViolation(&'static str),
}

/// Result alias for frame parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while unwrapping bytes from the wire format.
///
/// A single corrupt frame never poisons the stream: [`FrameError`] describes
/// one failed frame, and the caller resynchronizes to the next start
/// delimiter rather than aborting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// No start delimiter (`0x7E`) was found within the resync window.
    #[error("sync lost: no start delimiter found")]
    SyncLost,

    /// A start delimiter was found but the buffered bytes end before a
    /// complete frame (length, payload, or checksum) was available.
    #[error("truncated frame: need {needed} more byte(s)")]
    TruncatedFrame {
        /// Additional bytes required to complete the frame.
        needed: usize,
    },

    /// The computed checksum does not match the trailing checksum byte.
    #[error("checksum mismatch: computed {computed:#04x}, found {found:#04x}")]
    ChecksumMismatch {
        /// Checksum computed from the payload.
        computed: u8,
        /// Checksum byte found on the wire.
        found: u8,
    },
}

/// Result alias for wire unframing.
pub type FrameResult<T> = Result<T, FrameError>;
