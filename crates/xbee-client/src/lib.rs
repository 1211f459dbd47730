//! Session façade
//!
//! A transport-agnostic session over an XBee radio: read-side framing and
//! resynchronization, a packet queue for ordinary inbound frames, and the
//! Bluetooth SRP unlock and GPM firmware update exchanges driven end to end.
//!
//! # Architecture
//!
//! [`Session`] owns a [`transport::DuplexChannel`] and is the only reader
//! and writer of it. It applies [`xbee_proto::wire`] on the way in and out,
//! queues decoded frames in an [`xbee_core::queue::PacketQueue`] for
//! subscribers, and drives [`xbee_core::srp::SrpSequencer`] and
//! [`xbee_core::gpm::GpmSequencer`] to completion for the two multi-round
//! exchanges this crate doesn't expect callers to hand-roll.
//!
//! # Components
//!
//! - [`Session`]: owns the channel, the read-side accumulator, and the
//!   sequencer-driving exchanges
//! - [`transport::DuplexChannel`]: the narrow channel interface a `Session`
//!   needs, implemented over serial, BLE, or an in-memory pipe
//! - [`SystemEnv`]: the production [`Environment`], backed by system time
//!   and the OS RNG
//! - [`SessionError`]: the façade's composed error type

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod session;
mod system_env;
pub mod transport;

pub use error::SessionError;
pub use session::Session;
pub use system_env::SystemEnv;
pub use xbee_core::env::Environment;
