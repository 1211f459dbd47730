#![allow(clippy::unwrap_used, missing_docs)]

use std::time::Duration;

use xbee_client::transport::DuplexChannel;
use xbee_client::{Session, SessionError};
use xbee_harness::{sim_channel_pair, SimEnv};
use xbee_proto::frames::modem_status::{ModemStatus, ModemStatusEvent};
use xbee_proto::frames::Frame;
use xbee_proto::wire::{self, ApiMode};

#[tokio::test]
async fn poll_once_decodes_a_frame_sent_raw() {
    let (mut a, b) = sim_channel_pair(256);
    let frame = Frame::ModemStatus(ModemStatus { event: ModemStatusEvent::Joined });
    a.write_all(&wire::wrap(&frame.serialize(), ApiMode::Escaped)).await.unwrap();

    let mut session = Session::new(b, SimEnv::with_seed(1), ApiMode::Escaped);
    session.poll_once().await.unwrap();
    let received = session.queue().pop_first(Duration::from_millis(200)).await.unwrap();
    assert_eq!(received, frame);
}

#[tokio::test]
async fn garbage_before_a_frame_is_skipped() {
    let (mut a, b) = sim_channel_pair(256);
    let frame = Frame::ModemStatus(ModemStatus { event: ModemStatusEvent::Disassociated });
    let mut stream = vec![0x00, 0x01, 0x02];
    stream.extend_from_slice(&wire::wrap(&frame.serialize(), ApiMode::Escaped));
    a.write_all(&stream).await.unwrap();

    let mut session = Session::new(b, SimEnv::with_seed(2), ApiMode::Escaped);
    session.poll_once().await.unwrap();
    let received = session.queue().pop_first(Duration::from_millis(200)).await.unwrap();
    assert_eq!(received, frame);
}

#[tokio::test]
async fn send_round_trips_through_the_wire_framer() {
    let (a, mut b) = sim_channel_pair(256);
    let frame = Frame::ModemStatus(ModemStatus { event: ModemStatusEvent::CoordinatorStarted });
    let mut session = Session::new(a, SimEnv::with_seed(3), ApiMode::Escaped);
    session.send(&frame).await.unwrap();

    let mut buf = [0u8; 64];
    let n = b.read(&mut buf).await.unwrap();
    let wire::Unwrapped { payload, .. } = wire::unwrap(&buf[..n], ApiMode::Escaped).unwrap();
    assert_eq!(Frame::parse(&payload).unwrap(), frame);
}

#[tokio::test]
async fn unlock_over_an_unresponsive_channel_times_out() {
    let (client_channel, _device_channel) = sim_channel_pair(256);
    let mut session = Session::new(client_channel, SimEnv::with_seed(4), ApiMode::Escaped);
    let config = xbee_core::srp::SrpConfig { phase_timeout: Duration::from_millis(50) };
    let result = session.run_bluetooth_unlock(b"user".to_vec(), b"pass".to_vec(), config).await;
    assert!(matches!(result, Err(SessionError::Srp(_))));
}
