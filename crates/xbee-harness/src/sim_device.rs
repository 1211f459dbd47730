//! An in-process simulated XBee device: the other end of a [`SimChannel`]
//! pair, answering Bluetooth unlock and GPM update requests with real SRP-6a
//! math and canned GPM responses.

use std::time::Duration;

use bytes::Bytes;
use sha2::Sha256;
use srp::{groups::G_2048, server::SrpServer};
use xbee_client::transport::DuplexChannel;
use xbee_core::env::Environment;
use xbee_proto::{
    address::{Address16, Address64, ClusterId, Endpoint, ProfileId},
    error::FrameError,
    frames::{
        bluetooth::{BluetoothUnlockRequest, BluetoothUnlockResponse, SrpPhase},
        explicit::{ExplicitAddressingRequest, ExplicitRxIndicator},
        modem_status::{ModemStatus, ModemStatusEvent},
        receive::ReceiveOptions,
        transmit::{DeliveryStatus, DiscoveryStatus, TransmitStatus},
    },
    wire::{self, ApiMode},
    Frame,
};

const ENDPOINT: Endpoint = Endpoint(0xE6);
const CLUSTER: ClusterId = ClusterId([0x00, 0x23]);
const PROFILE: ProfileId = ProfileId([0xC1, 0x05]);

const CMD_INFO: u8 = 0x00;
const CMD_ERASE: u8 = 0x01;
const CMD_WRITE: u8 = 0x02;
const CMD_VERIFY: u8 = 0x05;
const CMD_VERIFY_INSTALL: u8 = 0x06;
const RESP_INFO: u8 = 0x80;
const RESP_ERASE: u8 = 0x81;
const RESP_WRITE: u8 = 0x82;
const RESP_VERIFY: u8 = 0x85;
const RESP_VERIFY_INSTALL: u8 = 0x86;

/// The device's GPM flash geometry, reported in response to an Info command.
#[derive(Debug, Clone, Copy)]
pub struct GpmGeometry {
    /// Number of erasable blocks.
    pub blocks: u32,
    /// Bytes per block.
    pub bytes_per_block: u32,
}

impl Default for GpmGeometry {
    fn default() -> Self {
        Self { blocks: 64, bytes_per_block: 4096 }
    }
}

/// SRP-6a credentials the device's unlock responder checks incoming
/// handshakes against.
pub struct DeviceCredentials {
    verifier: Vec<u8>,
    salt: [u8; 16],
}

impl DeviceCredentials {
    /// Derive the credentials the device expects a client to authenticate
    /// with `username`/`password` against.
    #[must_use]
    pub fn new(username: &[u8], password: &[u8], salt: [u8; 16]) -> Self {
        let verifier =
            srp::client::SrpClient::<Sha256>::new(&G_2048).compute_verifier(username, password, &salt);
        Self { verifier, salt }
    }
}

/// Address the simulated device answers to, as seen from the client.
#[derive(Debug, Clone, Copy)]
pub struct DeviceAddress {
    /// 64-bit address.
    pub addr64: Address64,
    /// 16-bit address.
    pub addr16: Address16,
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self {
            addr64: Address64([0x00, 0x13, 0xA2, 0x00, 0x40, 0xAA, 0xBB, 0xCC]),
            addr16: Address16([0xFF, 0xFE]),
        }
    }
}

/// The device's side of an in-progress unlock handshake. Mirrors
/// `xbee_core::srp::SrpSequencer`'s state-per-variant shape from the
/// server's perspective: each state owns exactly the material its next
/// phase needs.
enum UnlockState {
    Idle,
    SentB { b_random: [u8; 64] },
    SentM2,
}

/// Runs the simulated device's read/respond loop against one end of a
/// [`SimChannel`] pair until the channel closes.
///
/// Accepts a Bluetooth unlock handshake authenticated against its
/// credentials, and GPM update requests against a flash of the given
/// geometry, reporting itself as the given address. The image content
/// isn't checked; every write and verify step for the reserved GPM cluster
/// succeeds.
pub struct SimDevice<C, E> {
    channel: C,
    env: E,
    mode: ApiMode,
    buffer: Vec<u8>,
    credentials: DeviceCredentials,
    address: DeviceAddress,
    geometry: GpmGeometry,
    reboot_delay: Duration,
    unlock: UnlockState,
}

impl<C, E> SimDevice<C, E>
where
    C: DuplexChannel,
    E: Environment,
{
    /// Build a device over `channel`, using `env` for randomness and the
    /// reboot delay's sleep.
    #[must_use]
    pub fn new(
        channel: C,
        env: E,
        mode: ApiMode,
        credentials: DeviceCredentials,
        address: DeviceAddress,
        geometry: GpmGeometry,
    ) -> Self {
        Self {
            channel,
            env,
            mode,
            buffer: Vec::new(),
            credentials,
            address,
            geometry,
            reboot_delay: Duration::from_millis(10),
            unlock: UnlockState::Idle,
        }
    }

    /// Serve requests until the channel closes (`read` returns `Ok(0)` or an
    /// error), ignoring any frame type this device doesn't simulate.
    pub async fn run(mut self) {
        loop {
            let Some(frame) = self.next_frame().await else { return };
            let outcome = match frame {
                Frame::BluetoothUnlock(request) => self.handle_unlock(&request).await,
                Frame::ExplicitAddressingRequest(request) => self.handle_gpm_request(&request).await,
                _ => Ok(()),
            };
            if outcome.is_err() {
                return;
            }
        }
    }

    async fn handle_unlock(&mut self, request: &BluetoothUnlockRequest) -> Result<(), ()> {
        let response = self.respond_to_unlock(request);
        self.send(response).await
    }

    fn respond_to_unlock(&mut self, request: &BluetoothUnlockRequest) -> Frame {
        match (std::mem::replace(&mut self.unlock, UnlockState::Idle), request.phase) {
            (UnlockState::Idle, SrpPhase::Phase1) => {
                let server = SrpServer::<Sha256>::new(&G_2048);
                let mut b_random = [0u8; 64];
                self.env.random_bytes(&mut b_random);
                let b_pub = server.compute_public_ephemeral(&b_random, &self.credentials.verifier);
                self.unlock = UnlockState::SentB { b_random };
                let mut payload = self.credentials.salt.to_vec();
                payload.extend_from_slice(&b_pub);
                Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Phase {
                    phase: SrpPhase::Phase1,
                    payload: payload.into(),
                })
            }
            (UnlockState::SentB { b_random }, SrpPhase::Phase2) => {
                let server = SrpServer::<Sha256>::new(&G_2048);
                let Ok(verifier) =
                    server.process_reply(&b_random, &self.credentials.verifier, &request.payload)
                else {
                    return Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Error(0x03));
                };
                if verifier.verify_client(&request.payload).is_err() {
                    return Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Error(0x03));
                }
                let m2 = verifier.proof().to_vec();
                self.unlock = UnlockState::SentM2;
                Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Phase {
                    phase: SrpPhase::Phase2,
                    payload: m2.into(),
                })
            }
            (UnlockState::SentM2, SrpPhase::Phase3) => {
                let mut nonce = [0u8; 16];
                self.env.random_bytes(&mut nonce);
                self.unlock = UnlockState::Idle;
                Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Phase {
                    phase: SrpPhase::Phase4,
                    payload: nonce.to_vec().into(),
                })
            }
            (_, _) => {
                self.unlock = UnlockState::Idle;
                Frame::BluetoothUnlockResponse(BluetoothUnlockResponse::Error(0x04))
            }
        }
    }

    async fn handle_gpm_request(&mut self, request: &ExplicitAddressingRequest) -> Result<(), ()> {
        if request.cluster_id != CLUSTER || request.profile_id != PROFILE {
            return Ok(());
        }

        self.send(Frame::TransmitStatus(TransmitStatus {
            frame_id: request.frame_id,
            dest16: self.address.addr16,
            retry_count: 0,
            delivery_status: DeliveryStatus::Success,
            discovery_status: DiscoveryStatus::NoDiscoveryOverhead,
        }))
        .await?;

        let Some(response) = self.gpm_response(&request.rf_data) else { return Ok(()) };
        self.send(Frame::ExplicitRxIndicator(ExplicitRxIndicator {
            source64: self.address.addr64,
            source16: self.address.addr16,
            source_endpoint: ENDPOINT,
            dest_endpoint: ENDPOINT,
            cluster_id: CLUSTER,
            profile_id: PROFILE,
            receive_options: ReceiveOptions(0),
            rf_data: response.into(),
        }))
        .await?;

        if request.rf_data.first() == Some(&CMD_VERIFY_INSTALL) {
            self.env.sleep(self.reboot_delay).await;
            self.send(Frame::ModemStatus(ModemStatus { event: ModemStatusEvent::HardwareReset })).await?;
        }

        Ok(())
    }

    fn gpm_response(&self, command: &Bytes) -> Option<Vec<u8>> {
        match command.first()? {
            &CMD_INFO => {
                let mut out = vec![RESP_INFO, 0x00];
                out.extend_from_slice(&self.geometry.blocks.to_be_bytes());
                out.extend_from_slice(&self.geometry.bytes_per_block.to_be_bytes());
                Some(out)
            }
            &CMD_ERASE => Some(vec![RESP_ERASE, 0x00]),
            &CMD_WRITE => Some(vec![RESP_WRITE, 0x00]),
            &CMD_VERIFY => Some(vec![RESP_VERIFY, 0x00]),
            &CMD_VERIFY_INSTALL => Some(vec![RESP_VERIFY_INSTALL, 0x00]),
            _ => None,
        }
    }

    async fn send(&mut self, frame: Frame) -> Result<(), ()> {
        let wire = wire::wrap(&frame.serialize(), self.mode);
        self.channel.write_all(&wire).await.map_err(|_| ())
    }

    async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match wire::unwrap(&self.buffer, self.mode) {
                Ok(wire::Unwrapped { payload, consumed }) => {
                    self.buffer.drain(..consumed);
                    return Frame::parse(&payload).ok();
                }
                Err(FrameError::TruncatedFrame { .. }) => self.read_more().await?,
                Err(FrameError::SyncLost) => {
                    self.buffer.clear();
                    self.read_more().await?;
                }
                Err(FrameError::ChecksumMismatch { .. }) => {
                    self.buffer.remove(0);
                }
            }
        }
    }

    async fn read_more(&mut self) -> Option<()> {
        let mut chunk = [0u8; 256];
        let n = self.channel.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        self.buffer.extend_from_slice(&chunk[..n]);
        Some(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use xbee_client::Session;
    use xbee_core::{gpm::GpmConfig, srp::SrpConfig};

    use super::*;
    use crate::{sim_channel::sim_channel_pair, sim_env::SimEnv};

    #[tokio::test]
    async fn bluetooth_unlock_reaches_a_session_key() {
        let (client_channel, device_channel) = sim_channel_pair(4096);
        let salt = [0x33u8; 16];
        let credentials = DeviceCredentials::new(b"xbee-unlock", b"hunter2", salt);
        let device = SimDevice::new(
            device_channel,
            SimEnv::with_seed(1),
            ApiMode::Escaped,
            credentials,
            DeviceAddress::default(),
            GpmGeometry::default(),
        );
        tokio::spawn(device.run());

        let mut session = Session::new(client_channel, SimEnv::with_seed(2), ApiMode::Escaped);
        let key = session
            .run_bluetooth_unlock(b"xbee-unlock".to_vec(), b"hunter2".to_vec(), SrpConfig::default())
            .await
            .unwrap();
        assert_eq!(key.as_bytes().len(), 32);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (client_channel, device_channel) = sim_channel_pair(4096);
        let salt = [0x44u8; 16];
        let credentials = DeviceCredentials::new(b"xbee-unlock", b"hunter2", salt);
        let device = SimDevice::new(
            device_channel,
            SimEnv::with_seed(1),
            ApiMode::Escaped,
            credentials,
            DeviceAddress::default(),
            GpmGeometry::default(),
        );
        tokio::spawn(device.run());

        let mut session = Session::new(client_channel, SimEnv::with_seed(3), ApiMode::Escaped);
        let result = session
            .run_bluetooth_unlock(b"xbee-unlock".to_vec(), b"wrong-password".to_vec(), SrpConfig::default())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn firmware_update_reaches_completion() {
        let (client_channel, device_channel) = sim_channel_pair(8192);
        let credentials = DeviceCredentials::new(b"unused", b"unused", [0u8; 16]);
        let address = DeviceAddress::default();
        let device = SimDevice::new(
            device_channel,
            SimEnv::with_seed(4),
            ApiMode::Escaped,
            credentials,
            address,
            GpmGeometry { blocks: 4, bytes_per_block: 16 },
        );
        tokio::spawn(device.run());

        let mut session = Session::new(client_channel, SimEnv::with_seed(5), ApiMode::Escaped);
        let mut progress_events = Vec::new();
        session
            .run_firmware_update(
                address.addr64,
                address.addr16,
                vec![0xCDu8; 24],
                8,
                GpmConfig::default(),
                |progress| progress_events.push(progress.percent),
            )
            .await
            .unwrap();

        assert_eq!(progress_events.last(), Some(&100));
    }
}
