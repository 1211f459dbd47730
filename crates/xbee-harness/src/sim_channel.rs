//! An in-memory [`DuplexChannel`] pair standing in for a serial port or BLE
//! link in tests.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use xbee_client::transport::DuplexChannel;

/// One end of an in-memory byte pipe.
///
/// Build a connected pair with [`sim_channel_pair`].
pub struct SimChannel {
    stream: DuplexStream,
}

impl DuplexChannel for SimChannel {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await
    }

    async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf).await
    }
}

/// Create a connected pair of [`SimChannel`]s, each able to write to and
/// read from the other, buffering up to `capacity` bytes in each direction.
#[must_use]
pub fn sim_channel_pair(capacity: usize) -> (SimChannel, SimChannel) {
    let (a, b) = tokio::io::duplex(capacity);
    (SimChannel { stream: a }, SimChannel { stream: b })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bytes_written_on_one_end_arrive_on_the_other() {
        let (mut a, mut b) = sim_channel_pair(64);
        a.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        b.read(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");
    }
}
