//! The byte-oriented duplex channel a [`crate::Session`] drives.
//!
//! XBee modules are reached over a serial UART or a Bluetooth GATT
//! characteristic depending on the host platform; neither detail belongs in
//! this crate. [`DuplexChannel`] is the narrow interface a `Session` needs
//! from either: write bytes out, read whatever bytes are available in.
//! Production code implements it over `tokio-serial` or a GATT notify/write
//! pair; tests and simulation implement it over an in-memory byte pipe.

use std::{future::Future, io};

/// A duplex byte channel to an XBee module.
///
/// Implementations are not expected to frame or escape anything — that is
/// [`xbee_proto::wire`]'s job, applied by the [`crate::Session`] that holds
/// this channel. `read` should return `Ok(0)` only when the channel is
/// permanently closed, matching [`std::io::Read`]'s convention.
pub trait DuplexChannel: Send {
    /// Write the entirety of `data` to the channel.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Read at least one byte into `buf`, returning how many were read.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}
