//! Packet queue, Bluetooth SRP unlock sequencer, and GPM firmware update
//! sequencer for XBee radios.
//!
//! # Components
//!
//! - [`queue::PacketQueue`]: bounded FIFO of decoded frames with typed and
//!   address-filtered retrieval, sitting between the wire reader and every
//!   consumer.
//! - [`srp::SrpSequencer`]: drives the four-phase SRP-6a Bluetooth unlock
//!   handshake.
//! - [`gpm::GpmSequencer`]: drives a GPM firmware update from image info
//!   through erase, paged writes, verify, and install.
//!
//! Both sequencers use the action pattern: methods take an input (a timeout,
//! a device response) and return an action for the caller to execute, the
//! same Sans-IO approach [`env::Environment`] is built around. This keeps
//! the protocol logic itself free of any transport or timer concerns, so it
//! can be driven identically against a real radio or a simulated one.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod env;
pub mod error;
pub mod gpm;
pub mod queue;
pub mod srp;

pub use env::Environment;
pub use error::{GpmError, GpmStep, QueueError, SrpError};
pub use gpm::{GpmConfig, GpmSequencer};
pub use queue::{PacketQueue, RemoteAddress};
pub use srp::{SrpConfig, SrpPhaseKind, SrpSequencer};
