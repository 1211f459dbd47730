//! SRP-6a client math for the Bluetooth unlock handshake.
//!
//! Pure functions with deterministic outputs: callers supply the ephemeral
//! secret's random bytes, so the sequencer's tests can drive a fixed
//! transcript instead of fighting a hidden RNG. This crate has no knowledge
//! of frames or phases; [`xbee_core`](../xbee_core/index.html)'s SRP
//! sequencer is the only caller and owns the mapping from phase bytes to
//! these values.
//!
//! # Exchange shape
//!
//! ```text
//! client                              device
//!   │  A = g^a mod N                    │
//!   │ ───────────────────────────────►  │  picks salt, b; B = k*v + g^b mod N
//!   │                                    │
//!   │  ◄─────────────────────────────── │  salt, B
//!   │  M1 = H(A, B, K)                   │
//!   │ ───────────────────────────────►  │  verifies M1, computes M2
//!   │                                    │
//!   │  ◄─────────────────────────────── │  M2
//!   │  verify M2, derive session key K   │
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use sha2::Sha256;
use srp::{
    client::{SrpClient, SrpClientVerifier},
    groups::G_2048,
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

fn group() -> &'static srp::types::SrpGroup {
    &G_2048
}

/// Errors from the SRP-6a exchange.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrpError {
    /// The device's `M2` did not match the client's computed proof.
    #[error("server verification failed")]
    ServerVerificationFailed,
    /// The device offered a public ephemeral `B` that SRP-6a treats as
    /// invalid (zero mod N, or similarly degenerate).
    #[error("server offered a degenerate public ephemeral")]
    DegeneratePublicEphemeral,
}

/// The client's ephemeral secret `a` and public value `A`. The secret half
/// is zeroized on drop.
pub struct EphemeralKeypair {
    a: Secret,
    public: Vec<u8>,
}

#[derive(ZeroizeOnDrop)]
struct Secret(Vec<u8>);

impl EphemeralKeypair {
    /// Derive `A = g^a mod N` from caller-supplied random bytes for `a`.
    ///
    /// `a_random` should come from [`xbee_core`](../xbee_core/index.html)'s
    /// `Environment::random_bytes`, not a bare system RNG, so simulated runs
    /// can replay the exact same handshake.
    #[must_use]
    pub fn from_random(a_random: &[u8]) -> Self {
        let client = SrpClient::<Sha256>::new(group());
        let public = client.compute_public_ephemeral(a_random);
        Self { a: Secret(a_random.to_vec()), public }
    }

    /// The public ephemeral `A`, sent to the device as the SRP phase-1
    /// payload.
    #[must_use]
    pub fn public(&self) -> &[u8] {
        &self.public
    }
}

/// The client's proof `M1`, computed from the device's `(salt, B)` reply,
/// plus the machinery to verify the device's `M2` once it arrives.
pub struct ClientProof {
    verifier: SrpClientVerifier<Sha256>,
}

impl ClientProof {
    /// Process the device's phase-1 reply (`salt`, `B`) against the unlock
    /// password and compute `M1`.
    ///
    /// # Errors
    ///
    /// `SrpError::DegeneratePublicEphemeral` if `b_pub` is invalid for this
    /// group.
    pub fn compute(
        keypair: &EphemeralKeypair,
        username: &[u8],
        password: &[u8],
        salt: &[u8],
        b_pub: &[u8],
    ) -> Result<Self, SrpError> {
        let client = SrpClient::<Sha256>::new(group());
        let verifier = client
            .process_reply(&keypair.a.0, username, password, salt, b_pub)
            .map_err(|_| SrpError::DegeneratePublicEphemeral)?;
        Ok(Self { verifier })
    }

    /// `M1`, the client's proof sent as the SRP phase-2 payload.
    #[must_use]
    pub fn m1(&self) -> &[u8] {
        self.verifier.proof()
    }

    /// Verify the device's `M2` (the SRP phase-3 payload) and, on success,
    /// return the shared session key.
    ///
    /// # Errors
    ///
    /// `SrpError::ServerVerificationFailed` if `m2` does not match.
    pub fn verify(&self, m2: &[u8]) -> Result<SessionKey, SrpError> {
        self.verifier.verify_server(m2).map_err(|_| SrpError::ServerVerificationFailed)?;
        Ok(SessionKey(self.verifier.key().to_vec()))
    }
}

/// The shared session key derived at the end of a successful SRP exchange.
/// Zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct SessionKey(Vec<u8>);

impl SessionKey {
    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Zeroize for Secret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERNAME: &[u8] = b"xbee-unlock";

    #[test]
    fn mutual_handshake_agrees_on_a_session_key() {
        // a minimal client/server round trip using the same crate on both
        // sides, to pin the call shape the sequencer drives.
        use srp::{client::SrpClient, server::SrpServer};

        let password = b"correct horse battery staple";
        let client_a_random = [0x11u8; 64];
        let server_b_random = [0x22u8; 64];
        let salt = [0x33u8; 16];

        let verifier = SrpClient::<Sha256>::new(group()).compute_verifier(USERNAME, password, &salt);

        let client_keypair = EphemeralKeypair::from_random(&client_a_random);
        let server = SrpServer::<Sha256>::new(group());
        let b_pub = server.compute_public_ephemeral(&server_b_random, &verifier);

        let client_proof =
            ClientProof::compute(&client_keypair, USERNAME, password, &salt, &b_pub).unwrap();

        let server_verifier = server
            .process_reply(&server_b_random, &verifier, client_keypair.public())
            .unwrap();
        server_verifier.verify_client(client_proof.m1()).unwrap();

        let client_key = client_proof.verify(server_verifier.proof()).unwrap();
        assert_eq!(client_key.as_bytes(), server_verifier.key());
    }

    #[test]
    fn bad_password_fails_verification() {
        let password = b"correct horse battery staple";
        let wrong_password = b"wrong password entirely";
        let client_a_random = [0x11u8; 64];
        let server_b_random = [0x22u8; 64];
        let salt = [0x33u8; 16];

        use srp::{client::SrpClient, server::SrpServer};
        let verifier = SrpClient::<Sha256>::new(group()).compute_verifier(USERNAME, password, &salt);

        let client_keypair = EphemeralKeypair::from_random(&client_a_random);
        let server = SrpServer::<Sha256>::new(group());
        let b_pub = server.compute_public_ephemeral(&server_b_random, &verifier);

        let client_proof =
            ClientProof::compute(&client_keypair, USERNAME, wrong_password, &salt, &b_pub).unwrap();

        let server_verifier =
            server.process_reply(&server_b_random, &verifier, client_keypair.public()).unwrap();
        assert!(server_verifier.verify_client(client_proof.m1()).is_err());
    }
}
