//! C4: the Bluetooth unlock sequencer.
//!
//! Drives the four-phase SRP-6a exchange carried by `BluetoothUnlock`
//! request/response frames. Like [`crate::connection`], this is an
//! action-pattern state machine: [`SrpSequencer::start`] and
//! [`SrpSequencer::on_response`] take inputs and return an [`SrpAction`] for
//! the caller to send, keeping the cryptography and the phase bookkeeping
//! free of any actual I/O.
//!
//! # State machine
//!
//! ```text
//! Start ──start──▶ WaitB ──phase1 reply──▶ WaitM2 ──phase2 reply──▶ WaitAck ──phase3 reply──▶ Unlocked
//! ```
//!
//! Each state owns exactly the crypto material that phase needs, so there is
//! no `Option` field that could be missing when a method assumes it's there.

use std::time::Duration;

use xbee_crypto::{ClientProof, EphemeralKeypair, SessionKey};
use xbee_proto::frames::{
    bluetooth::{BluetoothUnlockRequest, BluetoothUnlockResponse, SrpPhase},
    Frame,
};

use crate::error::SrpError;

/// Time a sequencer waits for each phase's reply before giving up.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning knobs for [`SrpSequencer`].
#[derive(Debug, Clone, Copy)]
pub struct SrpConfig {
    /// How long to wait for each phase's reply.
    pub phase_timeout: Duration,
}

impl Default for SrpConfig {
    fn default() -> Self {
        Self { phase_timeout: DEFAULT_PHASE_TIMEOUT }
    }
}

/// Discriminant-only view of [`SrpState`], used for error reporting and the
/// sequencer's public [`SrpSequencer::phase`] accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrpPhaseKind {
    /// Nothing sent yet.
    Start,
    /// Phase 1 sent, waiting for salt and `B`.
    WaitB,
    /// Phase 2 sent, waiting for `M2`.
    WaitM2,
    /// Phase 3 sent, waiting for the device's acknowledgement.
    WaitAck,
    /// The handshake completed; a session key is available.
    Unlocked,
}

enum SrpState {
    Start,
    WaitB { keypair: EphemeralKeypair },
    WaitM2 { proof: ClientProof },
    WaitAck { session_key: SessionKey },
    Unlocked { session_key: SessionKey },
}

impl SrpState {
    fn kind(&self) -> SrpPhaseKind {
        match self {
            Self::Start => SrpPhaseKind::Start,
            Self::WaitB { .. } => SrpPhaseKind::WaitB,
            Self::WaitM2 { .. } => SrpPhaseKind::WaitM2,
            Self::WaitAck { .. } => SrpPhaseKind::WaitAck,
            Self::Unlocked { .. } => SrpPhaseKind::Unlocked,
        }
    }
}

/// A frame the caller must send next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrpAction(pub Frame);

fn request(phase: SrpPhase, payload: Vec<u8>) -> SrpAction {
    SrpAction(Frame::BluetoothUnlock(BluetoothUnlockRequest { phase, payload: payload.into() }))
}

/// Drives one Bluetooth unlock handshake to completion.
///
/// The unlock password is held as `Zeroizing` for the sequencer's lifetime;
/// nothing about it is retained once [`SrpSequencer::start`] consumes it into
/// the first ephemeral keypair's proof material.
pub struct SrpSequencer {
    state: SrpState,
    #[allow(dead_code)]
    config: SrpConfig,
    username: Vec<u8>,
    password: zeroize::Zeroizing<Vec<u8>>,
}

impl SrpSequencer {
    /// Create a sequencer for the given credentials. Call [`Self::start`] to
    /// begin the handshake.
    #[must_use]
    pub fn new(username: Vec<u8>, password: Vec<u8>, config: SrpConfig) -> Self {
        Self { state: SrpState::Start, config, username, password: password.into() }
    }

    /// The sequencer's current phase.
    #[must_use]
    pub fn phase(&self) -> SrpPhaseKind {
        self.state.kind()
    }

    /// The derived session key, once [`Self::phase`] is
    /// [`SrpPhaseKind::Unlocked`].
    #[must_use]
    pub fn session_key(&self) -> Option<&SessionKey> {
        match &self.state {
            SrpState::Unlocked { session_key } => Some(session_key),
            _ => None,
        }
    }

    /// Consume the sequencer and take ownership of the derived session key,
    /// once [`Self::phase`] is [`SrpPhaseKind::Unlocked`].
    #[must_use]
    pub fn into_session_key(self) -> Option<SessionKey> {
        match self.state {
            SrpState::Unlocked { session_key } => Some(session_key),
            _ => None,
        }
    }

    /// Begin the handshake: derive `A` from `a_random` and return the phase-1
    /// request to send.
    pub fn start(&mut self, a_random: &[u8]) -> SrpAction {
        let keypair = EphemeralKeypair::from_random(a_random);
        let action = request(SrpPhase::Phase1, keypair.public().to_vec());
        self.state = SrpState::WaitB { keypair };
        action
    }

    /// The caller's retrieval of a phase's reply timed out. Resets to
    /// [`SrpPhaseKind::Start`] — a fresh [`Self::start`] is required to retry.
    pub fn on_timeout(&mut self, elapsed: Duration) -> SrpError {
        let phase = self.state.kind();
        self.state = SrpState::Start;
        SrpError::PhaseTimeout { phase, elapsed }
    }

    /// Feed the device's response for whichever phase the sequencer is
    /// waiting on. Returns the next request to send, or `None` once the
    /// sequencer reaches [`SrpPhaseKind::Unlocked`].
    ///
    /// `fresh_random` supplies the client's own nonce/IV bytes sent as the
    /// phase-3 payload; the wire format doesn't tie its content to the
    /// session key, so any caller-supplied randomness satisfies it.
    ///
    /// # Errors
    ///
    /// Returns [`SrpError::DeviceRejected`] if the device sent an error code,
    /// [`SrpError::OutOfSequence`] if the reply's phase doesn't match what
    /// the sequencer expected, and [`SrpError::Crypto`] if the SRP math
    /// itself fails (bad password, degenerate ephemeral).
    pub fn on_response(
        &mut self,
        response: &BluetoothUnlockResponse,
        fresh_random: &[u8],
    ) -> Result<Option<SrpAction>, SrpError> {
        let (phase, payload) = match response {
            BluetoothUnlockResponse::Error(code) => {
                self.state = SrpState::Start;
                return Err(SrpError::DeviceRejected(*code));
            }
            BluetoothUnlockResponse::Phase { phase, payload } => (*phase, payload),
        };

        let state = std::mem::replace(&mut self.state, SrpState::Start);
        match state {
            SrpState::WaitB { keypair } => {
                self.accept_b(keypair, phase, payload).map(Some)
            }
            SrpState::WaitM2 { proof } => self.accept_m2(proof, phase, payload, fresh_random).map(Some),
            SrpState::WaitAck { session_key } => {
                self.accept_ack(session_key, phase);
                Ok(None)
            }
            other @ (SrpState::Start | SrpState::Unlocked { .. }) => {
                let expected = other.kind();
                self.state = other;
                Err(SrpError::OutOfSequence { expected, found: phase })
            }
        }
    }

    fn accept_b(
        &mut self,
        keypair: EphemeralKeypair,
        phase: SrpPhase,
        payload: &[u8],
    ) -> Result<SrpAction, SrpError> {
        if phase != SrpPhase::Phase1 {
            self.state = SrpState::WaitB { keypair };
            return Err(SrpError::OutOfSequence { expected: SrpPhaseKind::WaitB, found: phase });
        }
        let midpoint = payload.len() / 2;
        let (salt, b_pub) = payload.split_at(midpoint);
        let proof = ClientProof::compute(&keypair, &self.username, &self.password, salt, b_pub)?;
        let action = request(SrpPhase::Phase2, proof.m1().to_vec());
        self.state = SrpState::WaitM2 { proof };
        Ok(action)
    }

    fn accept_m2(
        &mut self,
        proof: ClientProof,
        phase: SrpPhase,
        payload: &[u8],
        fresh_random: &[u8],
    ) -> Result<SrpAction, SrpError> {
        if phase != SrpPhase::Phase2 {
            self.state = SrpState::WaitM2 { proof };
            return Err(SrpError::OutOfSequence { expected: SrpPhaseKind::WaitM2, found: phase });
        }
        let session_key = proof.verify(payload)?;
        let action = request(SrpPhase::Phase3, fresh_random.to_vec());
        self.state = SrpState::WaitAck { session_key };
        Ok(action)
    }

    fn accept_ack(&mut self, session_key: SessionKey, phase: SrpPhase) {
        // Phase 4's payload is the device's own nonce/IV; the wire format
        // gives the client nothing to verify it against, so any phase-4
        // reply completes the handshake.
        let _ = phase;
        self.state = SrpState::Unlocked { session_key };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sha2::Sha256;
    use srp::{client::SrpClient, groups::G_2048, server::SrpServer};

    use super::*;

    const USERNAME: &[u8] = b"xbee-unlock";
    const PASSWORD: &[u8] = b"correct horse battery staple";

    fn device_verifier(salt: &[u8]) -> Vec<u8> {
        SrpClient::<Sha256>::new(&G_2048).compute_verifier(USERNAME, PASSWORD, salt)
    }

    #[test]
    fn full_handshake_reaches_unlocked() {
        let salt = [0x33u8; 16];
        let verifier = device_verifier(&salt);
        let server = SrpServer::<Sha256>::new(&G_2048);
        let server_b_random = [0x22u8; 64];
        let b_pub = server.compute_public_ephemeral(&server_b_random, &verifier);

        let mut sequencer =
            SrpSequencer::new(USERNAME.to_vec(), PASSWORD.to_vec(), SrpConfig::default());
        let SrpAction(Frame::BluetoothUnlock(req1)) = sequencer.start(&[0x11u8; 64]) else {
            panic!("expected a BluetoothUnlock request");
        };
        assert_eq!(req1.phase, SrpPhase::Phase1);

        let mut salt_and_b = salt.to_vec();
        salt_and_b.extend_from_slice(&b_pub);
        let reply1 =
            BluetoothUnlockResponse::Phase { phase: SrpPhase::Phase1, payload: salt_and_b.into() };
        let action2 = sequencer.on_response(&reply1, &[]).unwrap().unwrap();
        assert_eq!(sequencer.phase(), SrpPhaseKind::WaitM2);

        let server_verifier =
            server.process_reply(&server_b_random, &verifier, &req1.payload).unwrap();
        let SrpAction(Frame::BluetoothUnlock(req2)) = action2 else {
            panic!("expected a BluetoothUnlock request");
        };
        server_verifier.verify_client(&req2.payload).unwrap();

        let reply2 = BluetoothUnlockResponse::Phase {
            phase: SrpPhase::Phase2,
            payload: server_verifier.proof().to_vec().into(),
        };
        let action3 = sequencer.on_response(&reply2, &[0xAAu8; 16]).unwrap().unwrap();
        assert_eq!(sequencer.phase(), SrpPhaseKind::WaitAck);
        let SrpAction(Frame::BluetoothUnlock(req3)) = action3 else {
            panic!("expected a BluetoothUnlock request");
        };
        assert_eq!(req3.phase, SrpPhase::Phase3);

        let reply3 = BluetoothUnlockResponse::Phase {
            phase: SrpPhase::Phase4,
            payload: vec![0xBBu8; 16].into(),
        };
        let next = sequencer.on_response(&reply3, &[]).unwrap();
        assert!(next.is_none());
        assert_eq!(sequencer.phase(), SrpPhaseKind::Unlocked);
        assert_eq!(sequencer.session_key().unwrap().as_bytes(), server_verifier.key());
    }

    #[test]
    fn device_error_code_resets_to_start() {
        let mut sequencer =
            SrpSequencer::new(USERNAME.to_vec(), PASSWORD.to_vec(), SrpConfig::default());
        sequencer.start(&[0x11u8; 64]);

        let err =
            sequencer.on_response(&BluetoothUnlockResponse::Error(0x02), &[]).unwrap_err();
        assert!(matches!(err, SrpError::DeviceRejected(0x02)));
        assert_eq!(sequencer.phase(), SrpPhaseKind::Start);
    }

    #[test]
    fn out_of_order_phase_is_rejected() {
        let mut sequencer =
            SrpSequencer::new(USERNAME.to_vec(), PASSWORD.to_vec(), SrpConfig::default());
        sequencer.start(&[0x11u8; 64]);

        let reply = BluetoothUnlockResponse::Phase { phase: SrpPhase::Phase3, payload: vec![].into() };
        let err = sequencer.on_response(&reply, &[]).unwrap_err();
        assert!(matches!(
            err,
            SrpError::OutOfSequence { expected: SrpPhaseKind::WaitB, found: SrpPhase::Phase3 }
        ));
        // the sequencer stays in WaitB so a correctly-phased reply can still land
        assert_eq!(sequencer.phase(), SrpPhaseKind::WaitB);
    }

    #[test]
    fn timeout_resets_to_start() {
        let mut sequencer =
            SrpSequencer::new(USERNAME.to_vec(), PASSWORD.to_vec(), SrpConfig::default());
        sequencer.start(&[0x11u8; 64]);
        let err = sequencer.on_timeout(Duration::from_secs(10));
        assert!(matches!(
            err,
            SrpError::PhaseTimeout { phase: SrpPhaseKind::WaitB, .. }
        ));
        assert_eq!(sequencer.phase(), SrpPhaseKind::Start);
    }
}
