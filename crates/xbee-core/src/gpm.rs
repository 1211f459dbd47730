//! C5: the GPM firmware update sequencer.
//!
//! Drives a firmware image through the GPM (General Purpose Memory) update
//! procedure — query, erase, paged write, verify, install, reboot — over
//! `ExplicitAddressingRequest`/`ExplicitRxIndicator` pairs on the reserved
//! GPM cluster. Like [`crate::srp`], this is an action-pattern state
//! machine: the caller feeds it transmit-status and explicit-indicator
//! frames as they arrive (in either order — see [`Rendezvous`]) and a
//! [`GpmSequencer`] returns the next frame to send plus progress events.
//!
//! Querying the device's maximum command length (`NP`, which bounds the
//! page size) is left to the caller's AT-command facility; this sequencer
//! only speaks the GPM command set and takes the page size as a parameter.

use bytes::Bytes;
use xbee_proto::{
    address::{Address16, Address64, ClusterId, Endpoint, ProfileId},
    frames::{
        explicit::{ExplicitAddressingRequest, ExplicitRxIndicator},
        modem_status::{ModemStatus, ModemStatusEvent},
        transmit::TransmitStatus,
    },
    Frame,
};

use crate::error::{GpmError, GpmStep};

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

/// Default number of attempts for a single write chunk before the update
/// fails with [`GpmError::WriteRetriesExhausted`].
pub const DEFAULT_WRITE_RETRIES: u8 = 3;

/// Default timeout for a single request/response round trip.
pub const DEFAULT_STEP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(90);

/// Tuning knobs for [`GpmSequencer`].
#[derive(Debug, Clone, Copy)]
pub struct GpmConfig {
    /// Attempts for a single write chunk before giving up on it.
    pub write_retries: u8,
    /// Timeout for each request/response round trip.
    pub step_timeout: std::time::Duration,
    /// Timeout waiting for the post-install hardware reset.
    pub reboot_timeout: std::time::Duration,
}

impl Default for GpmConfig {
    fn default() -> Self {
        Self {
            write_retries: DEFAULT_WRITE_RETRIES,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            reboot_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }
}

/// The sequencer's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpmPhase {
    /// Querying block count and block size.
    Info,
    /// Erasing GPM flash.
    Erase,
    /// Writing firmware pages.
    Write,
    /// Verifying the written image.
    Verify,
    /// Verifying and installing the image.
    VerifyInstall,
    /// Waiting for the device to reboot after a successful install.
    AwaitingReboot,
    /// The update completed.
    Done,
}

/// One outbound write: `data` (at most the negotiated page size) lands at
/// `offset` within GPM block `block`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct WriteChunk {
    block: u32,
    offset: u32,
    data: Vec<u8>,
}

/// Partition `image` into block-filling writes against a device with
/// `blocks` blocks of `bytes_per_block` bytes each.
///
/// Bytes are packed contiguously across block boundaries — a block's
/// remaining room is always filled before moving to the next one, so a
/// page never lands as its own short write just because it happened to
/// start near a boundary. Iteration stops once the block cursor reaches
/// `blocks`, even if image bytes remain — the device has no more room to
/// take them.
///
/// The trailing write is right-padded to the next `page_size` boundary
/// with `0xFF` only when the whole image fits in a single block-filling
/// write; once the image spans more than one block, each write carries
/// exactly the real bytes it was given; and the last fragment is
/// whatever is left, unpadded, since nothing beyond it is ever sent.
fn plan_writes(image: &[u8], page_size: usize, bytes_per_block: u32, blocks: u32) -> Vec<WriteChunk> {
    let total_capacity = u64::from(bytes_per_block) * u64::from(blocks);
    let real_written = (image.len() as u64).min(total_capacity) as usize;
    let reached_image_end = real_written == image.len();
    let fits_in_one_block = blocks > 0 && (real_written as u64) <= u64::from(bytes_per_block);

    let data: Vec<u8> = if reached_image_end && fits_in_one_block && page_size > 0 {
        let padded_len = real_written.div_ceil(page_size) * page_size;
        let padded_len = padded_len.min(bytes_per_block as usize);
        let mut data = image[..real_written].to_vec();
        data.resize(padded_len, 0xFF);
        data
    } else {
        image[..real_written].to_vec()
    };

    let mut chunks = Vec::new();
    let mut block = 0u32;
    let mut offset = 0u32;
    let mut cursor = 0usize;

    while cursor < data.len() && block < blocks {
        let available = bytes_per_block.saturating_sub(offset) as usize;
        let take = available.min(data.len() - cursor);
        chunks.push(WriteChunk { block, offset, data: data[cursor..cursor + take].to_vec() });
        cursor += take;
        offset += take as u32;
        if offset >= bytes_per_block {
            block += 1;
            offset = 0;
        }
    }

    chunks
}

#[derive(Debug, Clone, Default)]
struct Rendezvous {
    tx_ok: bool,
    response: Option<Bytes>,
}

impl Rendezvous {
    fn is_complete(&self) -> bool {
        self.tx_ok && self.response.is_some()
    }
}

enum StepState {
    Info,
    Erase,
    Write { chunks: Vec<WriteChunk>, index: usize, retries_left: u8 },
    Verify,
    VerifyInstall,
    AwaitingReboot,
    Done,
}

impl StepState {
    fn phase(&self) -> GpmPhase {
        match self {
            Self::Info => GpmPhase::Info,
            Self::Erase => GpmPhase::Erase,
            Self::Write { .. } => GpmPhase::Write,
            Self::Verify => GpmPhase::Verify,
            Self::VerifyInstall => GpmPhase::VerifyInstall,
            Self::AwaitingReboot => GpmPhase::AwaitingReboot,
            Self::Done => GpmPhase::Done,
        }
    }

    fn as_gpm_step(&self) -> Option<GpmStep> {
        match self {
            Self::Info => Some(GpmStep::Info),
            Self::Erase => Some(GpmStep::Erase),
            Self::Write { .. } => Some(GpmStep::Write),
            Self::Verify => Some(GpmStep::Verify),
            Self::VerifyInstall => Some(GpmStep::VerifyInstall),
            Self::AwaitingReboot | Self::Done => None,
        }
    }
}

/// A frame to send, or a progress update for a subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpmAction {
    /// Send this frame to the device.
    Send(Frame),
    /// Report progress to whoever is watching the update.
    Progress(GpmProgress),
}

/// One update-progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpmProgress {
    /// Human-readable description of the current step.
    pub message: String,
    /// Overall completion, `0..=100`.
    pub percent: u8,
}

/// Drives one firmware update to completion.
pub struct GpmSequencer {
    target64: Address64,
    target16: Address16,
    config: GpmConfig,
    image: Vec<u8>,
    page_size: usize,
    blocks: u32,
    bytes_per_block: u32,
    next_frame_id: u8,
    in_flight_frame_id: u8,
    state: StepState,
    pending: Rendezvous,
}

impl GpmSequencer {
    /// Create a sequencer for `image`, to be written `page_size` bytes at a
    /// time. Call [`Self::start`] to begin.
    #[must_use]
    pub fn new(
        target64: Address64,
        target16: Address16,
        image: Vec<u8>,
        page_size: usize,
        config: GpmConfig,
    ) -> Self {
        Self {
            target64,
            target16,
            config,
            image,
            page_size,
            blocks: 0,
            bytes_per_block: 0,
            next_frame_id: 1,
            in_flight_frame_id: 0,
            state: StepState::Info,
            pending: Rendezvous::default(),
        }
    }

    /// The sequencer's current phase.
    #[must_use]
    pub fn phase(&self) -> GpmPhase {
        self.state.phase()
    }

    /// Begin the update: send the Info request.
    pub fn start(&mut self) -> Vec<GpmAction> {
        vec![self.progress("querying device info", 0), self.send_command(vec![CMD_INFO])]
    }

    /// Feed a transmit-status frame. Returns actions if it completes the
    /// current step's rendezvous (alone, or together with an
    /// already-arrived explicit indicator).
    ///
    /// # Errors
    ///
    /// See [`Self::on_explicit_rx`].
    pub fn on_tx_status(&mut self, status: &TransmitStatus) -> Result<Vec<GpmAction>, GpmError> {
        if self.in_flight_frame_id == 0 || status.frame_id != self.in_flight_frame_id {
            return Ok(Vec::new());
        }
        if !status.delivery_status.is_delivered() {
            return self.on_request_delivery_failed();
        }
        self.pending.tx_ok = true;
        self.try_complete()
    }

    /// Feed an explicit-receive-indicator frame. Returns actions if it
    /// completes the current step's rendezvous.
    ///
    /// # Errors
    ///
    /// Returns a [`GpmError`] if the completed step's response is malformed
    /// or reports device failure, or if a write step's retries are
    /// exhausted.
    pub fn on_explicit_rx(&mut self, indicator: &ExplicitRxIndicator) -> Result<Vec<GpmAction>, GpmError> {
        if self.in_flight_frame_id == 0
            || indicator.source64 != self.target64
            || indicator.cluster_id != CLUSTER
            || indicator.profile_id != PROFILE
        {
            return Ok(Vec::new());
        }
        self.pending.response = Some(indicator.rf_data.clone());
        self.try_complete()
    }

    /// Feed a modem-status frame. Only meaningful while
    /// [`GpmPhase::AwaitingReboot`]; a `HardwareReset` event completes the
    /// update. A `WatchdogTimerReset` is not a normal post-install reboot
    /// and does not confirm the install, so it is left for the step timeout
    /// to handle instead.
    pub fn on_modem_status(&mut self, status: &ModemStatus) -> Vec<GpmAction> {
        if !matches!(self.state, StepState::AwaitingReboot)
            || status.event != ModemStatusEvent::HardwareReset
        {
            return Vec::new();
        }
        self.state = StepState::Done;
        vec![self.progress("update complete", 100)]
    }

    /// The in-flight request's timeout elapsed. Write steps retry up to
    /// [`GpmConfig::write_retries`] times before failing; every other step
    /// fails immediately.
    ///
    /// # Errors
    ///
    /// See [`Self::on_explicit_rx`], plus [`GpmError::NoModemReset`] while
    /// awaiting reboot.
    pub fn on_timeout(&mut self) -> Result<Vec<GpmAction>, GpmError> {
        if matches!(self.state, StepState::Write { .. }) {
            return self.retry_write();
        }
        if matches!(self.state, StepState::AwaitingReboot) {
            return Err(GpmError::NoModemReset(self.config.reboot_timeout));
        }
        if matches!(self.state, StepState::Done) {
            return Ok(Vec::new());
        }
        let step = self.state.as_gpm_step().unwrap_or_else(|| unreachable!("handled above"));
        Err(self.absence_error(step))
    }

    fn absence_error(&self, step: GpmStep) -> GpmError {
        if self.pending.tx_ok {
            GpmError::RxTimeout(step, self.config.step_timeout)
        } else {
            GpmError::TxStatusAbsent(step)
        }
    }

    fn on_request_delivery_failed(&mut self) -> Result<Vec<GpmAction>, GpmError> {
        if matches!(self.state, StepState::Write { .. }) {
            return self.retry_write();
        }
        let step = self
            .state
            .as_gpm_step()
            .unwrap_or_else(|| unreachable!("delivery failures only occur mid-step"));
        Err(GpmError::TxStatusAbsent(step))
    }

    fn try_complete(&mut self) -> Result<Vec<GpmAction>, GpmError> {
        if !self.pending.is_complete() {
            return Ok(Vec::new());
        }
        let response =
            self.pending.response.take().unwrap_or_else(|| unreachable!("is_complete checked this"));
        match &self.state {
            StepState::Info => self.advance_info(&response),
            StepState::Erase => self.advance_erase(&response),
            StepState::Write { .. } => self.advance_write(&response),
            StepState::Verify => self.advance_verify(&response),
            StepState::VerifyInstall => self.advance_verify_install(&response),
            StepState::AwaitingReboot | StepState::Done => Ok(Vec::new()),
        }
    }

    fn advance_info(&mut self, response: &[u8]) -> Result<Vec<GpmAction>, GpmError> {
        let rest = parse_response(RESP_INFO, response, GpmStep::Info)?;
        if rest.len() < 8 {
            return Err(GpmError::ResponseMalformed(GpmStep::Info));
        }
        self.blocks = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
        self.bytes_per_block = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]);
        self.state = StepState::Erase;
        Ok(vec![self.progress("erasing flash", 0), self.send_command(vec![CMD_ERASE, 0xFF])])
    }

    fn advance_erase(&mut self, response: &[u8]) -> Result<Vec<GpmAction>, GpmError> {
        parse_response(RESP_ERASE, response, GpmStep::Erase)?;
        let chunks = plan_writes(&self.image, self.page_size, self.bytes_per_block, self.blocks);
        if chunks.is_empty() {
            self.state = StepState::Verify;
            return Ok(vec![
                self.progress("writing firmware", 100),
                self.send_command(vec![CMD_VERIFY]),
            ]);
        }
        let first = chunks[0].clone();
        self.state = StepState::Write { chunks, index: 0, retries_left: self.config.write_retries };
        Ok(vec![
            self.progress("writing firmware", 0),
            self.send_command(write_command(first.block, first.offset, &first.data)),
        ])
    }

    fn advance_write(&mut self, response: &[u8]) -> Result<Vec<GpmAction>, GpmError> {
        match parse_response(RESP_WRITE, response, GpmStep::Write) {
            Ok(_) => {}
            Err(GpmError::DeviceError(_)) => return self.retry_write(),
            Err(other) => return Err(other),
        }

        let total = match &self.state {
            StepState::Write { chunks, .. } => chunks.len(),
            _ => unreachable!("advance_write only runs in the Write state"),
        };
        let next_index = match &mut self.state {
            StepState::Write { index, retries_left, .. } => {
                *index += 1;
                *retries_left = self.config.write_retries;
                *index
            }
            _ => unreachable!("advance_write only runs in the Write state"),
        };

        if next_index >= total {
            self.state = StepState::Verify;
            return Ok(vec![
                self.progress("writing firmware", 100),
                self.send_command(vec![CMD_VERIFY]),
            ]);
        }

        let percent = u8::try_from((next_index * 100) / total.max(1)).unwrap_or(100);
        let (block, offset, data) = match &self.state {
            StepState::Write { chunks, index, .. } => {
                let chunk = &chunks[*index];
                (chunk.block, chunk.offset, chunk.data.clone())
            }
            _ => unreachable!("just confirmed the Write state above"),
        };
        Ok(vec![
            self.progress("writing firmware", percent),
            self.send_command(write_command(block, offset, &data)),
        ])
    }

    fn retry_write(&mut self) -> Result<Vec<GpmAction>, GpmError> {
        let (retries_left, block, offset, data) = match &self.state {
            StepState::Write { chunks, index, retries_left } => {
                let chunk = &chunks[*index];
                (*retries_left, chunk.block, chunk.offset, chunk.data.clone())
            }
            _ => unreachable!("retry_write only runs in the Write state"),
        };
        if retries_left == 0 {
            return Err(GpmError::WriteRetriesExhausted { block, offset });
        }
        if let StepState::Write { retries_left, .. } = &mut self.state {
            *retries_left -= 1;
        }
        Ok(vec![self.send_command(write_command(block, offset, &data))])
    }

    fn advance_verify(&mut self, response: &[u8]) -> Result<Vec<GpmAction>, GpmError> {
        parse_response(RESP_VERIFY, response, GpmStep::Verify)?;
        self.state = StepState::VerifyInstall;
        Ok(vec![
            self.progress("verifying and installing", 100),
            self.send_command(vec![CMD_VERIFY_INSTALL]),
        ])
    }

    fn advance_verify_install(&mut self, response: &[u8]) -> Result<Vec<GpmAction>, GpmError> {
        parse_response(RESP_VERIFY_INSTALL, response, GpmStep::VerifyInstall)?;
        self.state = StepState::AwaitingReboot;
        Ok(vec![self.progress("waiting for device reboot", 100)])
    }

    fn send_command(&mut self, command: Vec<u8>) -> GpmAction {
        self.pending = Rendezvous::default();
        self.in_flight_frame_id = self.allocate_frame_id();
        GpmAction::Send(Frame::ExplicitAddressingRequest(ExplicitAddressingRequest {
            frame_id: self.in_flight_frame_id,
            dest64: self.target64,
            dest16: self.target16,
            source_endpoint: ENDPOINT,
            dest_endpoint: ENDPOINT,
            cluster_id: CLUSTER,
            profile_id: PROFILE,
            broadcast_radius: 0,
            transmit_options: 0,
            rf_data: command.into(),
        }))
    }

    fn allocate_frame_id(&mut self) -> u8 {
        let id = self.next_frame_id;
        self.next_frame_id = if self.next_frame_id == 255 { 1 } else { self.next_frame_id + 1 };
        id
    }

    fn progress(&self, message: &str, percent: u8) -> GpmAction {
        GpmAction::Progress(GpmProgress { message: message.to_string(), percent })
    }
}

fn write_command(block: u32, offset: u32, data: &[u8]) -> Vec<u8> {
    let mut out = vec![CMD_WRITE];
    out.extend_from_slice(&block.to_be_bytes());
    out.extend_from_slice(&offset.to_be_bytes());
    out.extend_from_slice(&(data.len() as u16).to_be_bytes());
    out.extend_from_slice(data);
    out
}

fn parse_response(expected_cmd: u8, payload: &[u8], step: GpmStep) -> Result<&[u8], GpmError> {
    if payload.len() < 2 || payload[0] != expected_cmd {
        return Err(GpmError::ResponseMalformed(step));
    }
    if payload[1] & 0x01 != 0 {
        return Err(GpmError::DeviceError(step));
    }
    Ok(&payload[2..])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use xbee_proto::frames::{
        receive::ReceiveOptions,
        transmit::{DeliveryStatus, DiscoveryStatus},
    };

    use super::*;

    const TARGET64: Address64 = Address64([0x00, 0x13, 0xA2, 0x00, 0x40, 0xAA, 0xBB, 0xCC]);
    const TARGET16: Address16 = Address16([0xFF, 0xFE]);

    fn tx_ok(frame_id: u8) -> TransmitStatus {
        TransmitStatus {
            frame_id,
            dest16: TARGET16,
            retry_count: 0,
            delivery_status: DeliveryStatus::Success,
            discovery_status: DiscoveryStatus::NoDiscoveryOverhead,
        }
    }

    fn rx(payload: Vec<u8>) -> ExplicitRxIndicator {
        ExplicitRxIndicator {
            source64: TARGET64,
            source16: TARGET16,
            source_endpoint: ENDPOINT,
            dest_endpoint: ENDPOINT,
            cluster_id: CLUSTER,
            profile_id: PROFILE,
            receive_options: ReceiveOptions(0),
            rf_data: payload.into(),
        }
    }

    fn in_flight_id(action: &GpmAction) -> u8 {
        match action {
            GpmAction::Send(Frame::ExplicitAddressingRequest(req)) => req.frame_id,
            _ => panic!("expected a Send(ExplicitAddressingRequest) action"),
        }
    }

    #[test]
    fn plan_writes_splits_a_page_across_a_block_boundary() {
        let image = vec![0xAB; 12];
        let chunks = plan_writes(&image, 8, 10, 4);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], WriteChunk { block: 0, offset: 0, data: vec![0xAB; 10] });
        assert_eq!(chunks[1], WriteChunk { block: 1, offset: 0, data: vec![0xAB; 2] });
    }

    #[test]
    fn plan_writes_pads_the_last_page_with_0xff() {
        let image = vec![0x01, 0x02, 0x03];
        let chunks = plan_writes(&image, 8, 64, 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].data, vec![0x01, 0x02, 0x03, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn plan_writes_stops_at_the_block_limit() {
        let image = vec![0xAB; 100];
        let chunks = plan_writes(&image, 8, 8, 2);
        assert!(chunks.iter().all(|c| c.block < 2));
    }

    #[test]
    fn full_update_reaches_done() {
        let mut seq =
            GpmSequencer::new(TARGET64, TARGET16, vec![0xCD; 4], 8, GpmConfig::default());

        let actions = seq.start();
        let id = in_flight_id(&actions[1]);
        assert_eq!(seq.phase(), GpmPhase::Info);

        let mut info_response = vec![RESP_INFO, 0x00];
        info_response.extend_from_slice(&4u32.to_be_bytes());
        info_response.extend_from_slice(&16u32.to_be_bytes());
        let a1 = seq.on_tx_status(&tx_ok(id)).unwrap();
        assert!(a1.is_empty());
        let a2 = seq.on_explicit_rx(&rx(info_response)).unwrap();
        assert_eq!(seq.phase(), GpmPhase::Erase);
        let id = in_flight_id(&a2[1]);

        seq.on_tx_status(&tx_ok(id)).unwrap();
        let a3 = seq.on_explicit_rx(&rx(vec![RESP_ERASE, 0x00])).unwrap();
        assert_eq!(seq.phase(), GpmPhase::Write);
        let mut id = in_flight_id(&a3[1]);

        loop {
            seq.on_tx_status(&tx_ok(id)).unwrap();
            let actions = seq.on_explicit_rx(&rx(vec![RESP_WRITE, 0x00])).unwrap();
            match seq.phase() {
                GpmPhase::Write => id = in_flight_id(&actions[1]),
                GpmPhase::Verify => {
                    id = in_flight_id(&actions[1]);
                    break;
                }
                other => panic!("unexpected phase {other:?}"),
            }
        }

        seq.on_tx_status(&tx_ok(id)).unwrap();
        let a4 = seq.on_explicit_rx(&rx(vec![RESP_VERIFY, 0x00])).unwrap();
        assert_eq!(seq.phase(), GpmPhase::VerifyInstall);
        let id = in_flight_id(&a4[1]);

        seq.on_tx_status(&tx_ok(id)).unwrap();
        seq.on_explicit_rx(&rx(vec![RESP_VERIFY_INSTALL, 0x00])).unwrap();
        assert_eq!(seq.phase(), GpmPhase::AwaitingReboot);

        let status = ModemStatus { event: xbee_proto::frames::modem_status::ModemStatusEvent::HardwareReset };
        seq.on_modem_status(&status);
        assert_eq!(seq.phase(), GpmPhase::Done);
    }

    #[test]
    fn write_retries_exhaust_after_three_failures() {
        let mut seq = GpmSequencer::new(
            TARGET64,
            TARGET16,
            vec![0xCD; 4],
            8,
            GpmConfig { write_retries: 1, ..GpmConfig::default() },
        );
        let actions = seq.start();
        let id = in_flight_id(&actions[1]);
        let mut info_response = vec![RESP_INFO, 0x00];
        info_response.extend_from_slice(&4u32.to_be_bytes());
        info_response.extend_from_slice(&16u32.to_be_bytes());
        seq.on_tx_status(&tx_ok(id)).unwrap();
        let a2 = seq.on_explicit_rx(&rx(info_response)).unwrap();
        let id = in_flight_id(&a2[1]);
        seq.on_tx_status(&tx_ok(id)).unwrap();
        let a3 = seq.on_explicit_rx(&rx(vec![RESP_ERASE, 0x00])).unwrap();
        let id = in_flight_id(&a3[1]);

        seq.on_tx_status(&tx_ok(id)).unwrap();
        let retried = seq.on_explicit_rx(&rx(vec![RESP_WRITE, 0x01])).unwrap();
        let id = in_flight_id(&retried[0]);

        seq.on_tx_status(&tx_ok(id)).unwrap();
        let err = seq.on_explicit_rx(&rx(vec![RESP_WRITE, 0x01])).unwrap_err();
        assert!(matches!(err, GpmError::WriteRetriesExhausted { .. }));
    }

    #[test]
    fn timeout_without_reboot_is_an_error() {
        let mut seq =
            GpmSequencer::new(TARGET64, TARGET16, vec![], 8, GpmConfig::default());
        seq.start();
        let err = seq.on_timeout().unwrap_err();
        assert!(matches!(err, GpmError::TxStatusAbsent(GpmStep::Info)));
    }
}
