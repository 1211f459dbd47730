//! XBee API frame codec: the binary frame taxonomy, field-level encode/decode
//! rules, and the wire-level delimiter/length/checksum/escape framer.
//!
//! This crate has no I/O of its own. [`Frame::serialize`]/[`Frame::parse`]
//! turn typed values into/from frame payloads; [`wire::wrap`]/[`wire::unwrap`]
//! turn those payloads into/from the bytes that actually cross a serial or
//! Bluetooth link. Callers own the duplex channel and call both layers.

pub mod address;
pub mod error;
pub mod frame_type;
pub mod frames;
pub mod wire;

pub use error::{FrameError, FrameResult, ParseError, ParseResult};
pub use frame_type::FrameType;
pub use frames::Frame;
pub use wire::{ApiMode, Unwrapped};
