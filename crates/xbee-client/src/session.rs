//! The session façade: a [`DuplexChannel`] plus the read-side accumulator,
//! packet queue, and sequencers that turn a raw byte stream into decoded
//! frames and completed protocol exchanges.

use std::time::Duration;

use xbee_core::{
    env::Environment,
    gpm::{GpmAction, GpmConfig, GpmPhase, GpmProgress, GpmSequencer},
    queue::PacketQueue,
    srp::{SrpConfig, SrpSequencer},
};
use xbee_crypto::SessionKey;
use xbee_proto::{
    address::{Address16, Address64},
    error::FrameError,
    frames::Frame,
    wire::{self, ApiMode},
};

use crate::error::SessionError;

/// Read chunk size for a single [`DuplexChannel::read`] call.
const READ_CHUNK: usize = 256;

/// Drives one [`DuplexChannel`] and turns its byte stream into decoded
/// [`Frame`]s.
///
/// A `Session` is the only reader and writer of its channel. Ordinary
/// inbound frames accumulate in an internal [`PacketQueue`] for
/// [`Self::queue`]'s subscribers; [`Self::run_bluetooth_unlock`] and
/// [`Self::run_firmware_update`] instead read the stream directly, since
/// both are one-shot exchanges the caller runs to completion before
/// returning to ordinary queue-backed use. Running one of those alongside
/// [`Self::poll_once`] on the same session will race for inbound frames —
/// don't do both at once.
pub struct Session<C, E> {
    channel: C,
    env: E,
    mode: ApiMode,
    buffer: Vec<u8>,
    queue: PacketQueue,
}

impl<C, E> Session<C, E>
where
    C: crate::transport::DuplexChannel,
    E: Environment,
{
    /// Wrap `channel`, using `env` for randomness during sequencer-driven
    /// exchanges.
    #[must_use]
    pub fn new(channel: C, env: E, mode: ApiMode) -> Self {
        Self { channel, env, mode, buffer: Vec::new(), queue: PacketQueue::default() }
    }

    /// The queue ordinary inbound frames accumulate in; see
    /// [`Self::poll_once`].
    #[must_use]
    pub fn queue(&self) -> &PacketQueue {
        &self.queue
    }

    /// Serialize and send one frame.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transport`] if the channel write fails.
    pub async fn send(&mut self, frame: &Frame) -> Result<(), SessionError> {
        let wire = wire::wrap(&frame.serialize(), self.mode);
        self.channel.write_all(&wire).await?;
        Ok(())
    }

    /// Decode the next complete frame off the channel, reading more bytes
    /// and resynchronizing past corrupt frames as needed.
    async fn next_frame(&mut self) -> Result<Frame, SessionError> {
        loop {
            match wire::unwrap(&self.buffer, self.mode) {
                Ok(wire::Unwrapped { payload, consumed }) => {
                    self.buffer.drain(..consumed);
                    return Frame::parse(&payload).map_err(SessionError::from);
                }
                Err(FrameError::TruncatedFrame { .. }) => self.read_more().await?,
                Err(FrameError::SyncLost) => {
                    tracing::debug!(discarded = self.buffer.len(), "sync lost, discarding buffer");
                    self.buffer.clear();
                    self.read_more().await?;
                }
                Err(FrameError::ChecksumMismatch { computed, found }) => {
                    tracing::warn!(computed, found, "checksum mismatch, resyncing past delimiter");
                    // drop the delimiter byte that led to this frame and
                    // retry the search from the next one.
                    self.buffer.remove(0);
                }
            }
        }
    }

    async fn read_more(&mut self) -> Result<(), SessionError> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.channel.read(&mut chunk).await?;
        if n == 0 {
            return Err(SessionError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "channel closed",
            )));
        }
        self.buffer.extend_from_slice(&chunk[..n]);
        Ok(())
    }

    async fn recv_within(&mut self, timeout: Duration) -> Result<Option<Frame>, SessionError> {
        match tokio::time::timeout(timeout, self.next_frame()).await {
            Ok(result) => result.map(Some),
            Err(_elapsed) => Ok(None),
        }
    }

    /// Decode one frame and push it onto [`Self::queue`] for subscribers.
    /// Meant to be called in a loop by a background task.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on a transport failure or an unparseable
    /// frame payload.
    pub async fn poll_once(&mut self) -> Result<(), SessionError> {
        let frame = self.next_frame().await?;
        self.queue.push(frame).await;
        Ok(())
    }

    /// Run the Bluetooth SRP-6a unlock handshake to completion, returning
    /// the derived session key.
    ///
    /// # Errors
    ///
    /// [`SessionError::Srp`] if the device rejects the handshake, replies
    /// out of sequence, or a phase times out; [`SessionError::Transport`] or
    /// [`SessionError::Wire`]/[`SessionError::Parse`] on a read/write or
    /// framing failure.
    pub async fn run_bluetooth_unlock(
        &mut self,
        username: Vec<u8>,
        password: Vec<u8>,
        config: SrpConfig,
    ) -> Result<SessionKey, SessionError> {
        let mut sequencer = SrpSequencer::new(username, password, config);

        let mut a_random = [0u8; 64];
        self.env.random_bytes(&mut a_random);
        let action = sequencer.start(&a_random);
        self.send(&action.0).await?;

        loop {
            let Some(frame) = self.recv_within(config.phase_timeout).await? else {
                return Err(sequencer.on_timeout(config.phase_timeout).into());
            };
            let Frame::BluetoothUnlockResponse(response) = frame else {
                self.queue.push(frame).await;
                continue;
            };

            let mut fresh_random = [0u8; 16];
            self.env.random_bytes(&mut fresh_random);
            match sequencer.on_response(&response, &fresh_random)? {
                Some(next) => self.send(&next.0).await?,
                None => {
                    return sequencer
                        .into_session_key()
                        .ok_or(SessionError::Protocol("sequencer unlocked but held no session key"));
                }
            };
        }
    }

    /// Run a GPM firmware update to completion, calling `on_progress` for
    /// every progress event along the way.
    ///
    /// # Errors
    ///
    /// [`SessionError::Gpm`] if the device reports a step failure, write
    /// retries are exhausted, or the post-install reboot never arrives;
    /// transport/framing errors otherwise.
    pub async fn run_firmware_update(
        &mut self,
        target64: Address64,
        target16: Address16,
        image: Vec<u8>,
        page_size: usize,
        config: GpmConfig,
        mut on_progress: impl FnMut(&GpmProgress) + Send,
    ) -> Result<(), SessionError> {
        let mut sequencer = GpmSequencer::new(target64, target16, image, page_size, config);
        self.dispatch_gpm_actions(sequencer.start(), &mut on_progress).await?;

        while sequencer.phase() != GpmPhase::Done {
            let timeout = if sequencer.phase() == GpmPhase::AwaitingReboot {
                config.reboot_timeout
            } else {
                config.step_timeout
            };

            let Some(frame) = self.recv_within(timeout).await? else {
                let actions = sequencer.on_timeout()?;
                self.dispatch_gpm_actions(actions, &mut on_progress).await?;
                continue;
            };

            let actions = match &frame {
                Frame::TransmitStatus(status) => sequencer.on_tx_status(status)?,
                Frame::ExplicitRxIndicator(indicator) => sequencer.on_explicit_rx(indicator)?,
                Frame::ModemStatus(status) => sequencer.on_modem_status(status),
                _ => {
                    self.queue.push(frame).await;
                    continue;
                }
            };
            self.dispatch_gpm_actions(actions, &mut on_progress).await?;
        }

        Ok(())
    }

    async fn dispatch_gpm_actions(
        &mut self,
        actions: Vec<GpmAction>,
        on_progress: &mut (impl FnMut(&GpmProgress) + Send),
    ) -> Result<(), SessionError> {
        for action in actions {
            match action {
                GpmAction::Send(frame) => self.send(&frame).await?,
                GpmAction::Progress(progress) => on_progress(&progress),
            }
        }
        Ok(())
    }
}
