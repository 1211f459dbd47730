//! Deterministic simulation harness
//!
//! A seeded [`Environment`](xbee_core::env::Environment) plus an in-process
//! simulated XBee device, so that the Bluetooth unlock and GPM update
//! exchanges in `xbee-client` can be driven end to end without real
//! hardware and reproduced exactly from a seed when a test fails.
//!
//! # Components
//!
//! - [`SimEnv`]: seeded randomness for deterministic SRP ephemeral secrets
//!   and nonces
//! - [`sim_channel`]: an in-memory byte pipe implementing
//!   [`xbee_client::transport::DuplexChannel`]
//! - [`SimDevice`]: the device side of the Bluetooth unlock and GPM update
//!   protocols, driven over a [`SimChannel`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod sim_channel;
mod sim_device;
mod sim_env;

pub use sim_channel::{SimChannel, sim_channel_pair};
pub use sim_device::{DeviceAddress, DeviceCredentials, GpmGeometry, SimDevice};
pub use sim_env::SimEnv;
