//! C3: the bounded packet queue that sits between the wire reader and every
//! consumer of inbound frames (the session façade's subscribers, and the
//! SRP/GPM sequencers' response correlation).
//!
//! Retrieval is poll-based rather than condvar-based, matching the
//! coarse-grained 100 ms granularity the device's own response latency
//! already imposes — there is no benefit to sub-millisecond wakeups here.

use std::{collections::VecDeque, time::Duration};

use tokio::{sync::Mutex, time::Instant};
use xbee_proto::{
    address::{Address16, Address64},
    frames::ipv4::RxIpv4,
    Frame,
};

use crate::error::QueueError;

/// Default capacity if [`PacketQueue::new`] isn't given one explicitly.
pub const DEFAULT_CAPACITY: usize = 50;

/// Granularity at which filtered retrieval polls for a match.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A remote device's addresses, as known to the caller. The 16-bit half may
/// be unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteAddress {
    /// 64-bit address, always known.
    pub addr64: Address64,
    /// 16-bit address, if resolved.
    pub addr16: Option<Address16>,
}

impl RemoteAddress {
    /// A remote address known only by its 64-bit half.
    #[must_use]
    pub fn from_addr64(addr64: Address64) -> Self {
        Self { addr64, addr16: None }
    }
}

enum Source {
    Wide(Address64, Address16),
    Narrow16(Address16),
    Narrow64(Address64),
    None,
}

fn source_of(frame: &Frame) -> Source {
    match frame {
        Frame::Receive(f) => Source::Wide(f.source64, f.source16),
        Frame::ExplicitRxIndicator(f) => Source::Wide(f.source64, f.source16),
        Frame::RemoteAtCommandResponse(f) => Source::Wide(f.source64, f.source16),
        Frame::IoDataSample(f) => Source::Wide(f.source64, f.source16),
        Frame::Rx16(f) => Source::Narrow16(f.source16),
        Frame::Rx16Io(f) => Source::Narrow16(f.source16),
        Frame::Rx64(f) => Source::Narrow64(f.source64),
        Frame::Rx64Io(f) => Source::Narrow64(f.source64),
        _ => Source::None,
    }
}

fn matches_remote(frame: &Frame, addr: RemoteAddress) -> bool {
    match source_of(frame) {
        Source::Wide(a64, a16) => {
            a64 == addr.addr64 || addr.addr16.is_some_and(|want| !a16.is_broadcast() && a16 == want)
        }
        Source::Narrow16(a16) => addr.addr16.is_some_and(|want| a16 == want),
        Source::Narrow64(a64) => a64 == addr.addr64,
        Source::None => false,
    }
}

fn is_data_frame(frame: &Frame) -> bool {
    matches!(frame, Frame::Receive(_) | Frame::Rx16(_) | Frame::Rx64(_))
}

/// Bounded insertion-ordered FIFO of decoded frames, with typed and
/// address-filtered retrieval. See module docs for the polling model.
pub struct PacketQueue {
    capacity: usize,
    entries: Mutex<VecDeque<Frame>>,
}

impl PacketQueue {
    /// Create a queue with the given capacity (must be at least 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity >= 1, "queue capacity must be at least 1");
        Self { capacity: capacity.max(1), entries: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    /// Push a frame, evicting the oldest entry first if at capacity.
    pub async fn push(&self, frame: Frame) {
        let mut entries = self.entries.lock().await;
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(frame);
    }

    /// Number of frames currently queued.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the queue is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn pop_matching(
        &self,
        timeout: Duration,
        mut matches: impl FnMut(&Frame) -> bool,
    ) -> Result<Frame, QueueError> {
        let deadline = Instant::now() + timeout;
        loop {
            {
                let mut entries = self.entries.lock().await;
                if let Some(pos) = entries.iter().position(&mut matches) {
                    return Ok(entries
                        .remove(pos)
                        .unwrap_or_else(|| unreachable!("position came from this deque")));
                }
            }
            if Instant::now() >= deadline {
                return Err(QueueError::Timeout(timeout));
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }

    /// The first queued frame of any kind.
    pub async fn pop_first(&self, timeout: Duration) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |_| true).await
    }

    /// The first frame whose source address matches `remote`.
    pub async fn pop_first_from(
        &self,
        remote: RemoteAddress,
        timeout: Duration,
    ) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| matches_remote(f, remote)).await
    }

    /// The first receive-indicator-family frame (`Receive`, `Rx16`, `Rx64`).
    pub async fn pop_first_data(&self, timeout: Duration) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| is_data_frame(f)).await
    }

    /// The first receive-indicator-family frame from `remote`.
    pub async fn pop_first_data_from(
        &self,
        remote: RemoteAddress,
        timeout: Duration,
    ) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| is_data_frame(f) && matches_remote(f, remote)).await
    }

    /// The first `ExplicitRxIndicator` frame.
    pub async fn pop_first_explicit(&self, timeout: Duration) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| matches!(f, Frame::ExplicitRxIndicator(_))).await
    }

    /// The first `ExplicitRxIndicator` frame from `remote`.
    pub async fn pop_first_explicit_from(
        &self,
        remote: RemoteAddress,
        timeout: Duration,
    ) -> Result<Frame, QueueError> {
        self.pop_matching(
            timeout,
            |f| matches!(f, Frame::ExplicitRxIndicator(_)) && matches_remote(f, remote),
        )
        .await
    }

    /// The first `UserDataRelayOutput` frame.
    pub async fn pop_first_user_data_relay(&self, timeout: Duration) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| matches!(f, Frame::UserDataRelayOutput(_))).await
    }

    /// The first `RxIpv4` frame.
    pub async fn pop_first_ip_data(&self, timeout: Duration) -> Result<Frame, QueueError> {
        self.pop_matching(timeout, |f| matches!(f, Frame::RxIpv4(_))).await
    }

    /// The first `RxIpv4` frame whose source IP matches `ip`.
    pub async fn pop_first_ip_data_from(
        &self,
        ip: [u8; 4],
        timeout: Duration,
    ) -> Result<Frame, QueueError> {
        self.pop_matching(
            timeout,
            |f| matches!(f, Frame::RxIpv4(RxIpv4 { source_ip, .. }) if *source_ip == ip),
        )
        .await
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use xbee_proto::frames::receive::{Receive, ReceiveOptions};

    use super::*;

    fn receive_from(addr64: Address64) -> Frame {
        Frame::Receive(Receive {
            source64: addr64,
            source16: Address16::UNKNOWN,
            receive_options: ReceiveOptions(0),
            rf_data: Bytes::new(),
        })
    }

    #[tokio::test]
    async fn overflow_evicts_the_oldest_entry() {
        let queue = PacketQueue::new(2);
        queue.push(receive_from(Address64([0; 8]))).await;
        queue.push(receive_from(Address64([1; 8]))).await;
        queue.push(receive_from(Address64([2; 8]))).await;
        assert_eq!(queue.len().await, 2);
        let first = queue.pop_first(Duration::ZERO).await.unwrap();
        assert!(matches!(first, Frame::Receive(Receive { source64, .. }) if source64 == Address64([1; 8])));
    }

    #[tokio::test]
    async fn pop_first_from_filters_by_address_and_preserves_order() {
        let queue = PacketQueue::new(DEFAULT_CAPACITY);
        let a = Address64([0xAA; 8]);
        let b = Address64([0xBB; 8]);
        queue.push(receive_from(a)).await;
        queue.push(receive_from(b)).await;
        queue.push(receive_from(a)).await;

        let remote = RemoteAddress::from_addr64(a);
        let first = queue.pop_first_from(remote, Duration::ZERO).await.unwrap();
        assert!(matches!(first, Frame::Receive(r) if r.source64 == a));

        let remaining = queue.pop_first(Duration::ZERO).await.unwrap();
        assert!(matches!(remaining, Frame::Receive(r) if r.source64 == b));

        let second_a = queue.pop_first_from(remote, Duration::ZERO).await.unwrap();
        assert!(matches!(second_a, Frame::Receive(r) if r.source64 == a));
    }

    #[tokio::test]
    async fn empty_queue_times_out_instead_of_blocking_forever() {
        let queue = PacketQueue::new(DEFAULT_CAPACITY);
        let result = queue.pop_first(Duration::from_millis(150)).await;
        assert!(matches!(result, Err(QueueError::Timeout(_))));
    }
}
