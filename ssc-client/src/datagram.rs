//! UDP datagram link for generation-1 devices.
//!
//! Generation-1 devices listen on UDP port 45 and answer from that same port.
//! Sends are fire-and-forget; whether the device is alive is judged by the
//! session layer from inbound traffic alone.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, trace};

use crate::error::Result;

/// Fixed SSC port used by generation-1 devices on both ends.
pub const SSC_UDP_PORT: u16 = 45;

/// Largest datagram a device sends.
const MAX_DATAGRAM: usize = 65_507;

/// A connectionless link to exactly one device.
///
/// `recv` only yields datagrams whose source matches the device address;
/// everything else is dropped inside the link.
#[async_trait]
pub trait DatagramLink: Send + Sync {
    /// Send one datagram to the device.
    async fn send(&self, payload: &[u8]) -> Result<()>;

    /// Wait for the next datagram from the device.
    async fn recv(&self) -> Result<Vec<u8>>;

    /// Address of the device this link talks to.
    fn device_addr(&self) -> SocketAddr;
}

/// [`DatagramLink`] over a tokio UDP socket.
#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    device: SocketAddr,
}

impl UdpLink {
    /// Bind a local socket and target the given device address.
    pub async fn bind(local: SocketAddr, device: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        debug!(local = %socket.local_addr()?, device = %device, "UDP link bound");
        Ok(Self { socket, device })
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl DatagramLink for UdpLink {
    async fn send(&self, payload: &[u8]) -> Result<()> {
        self.socket.send_to(payload, self.device).await?;
        trace!(device = %self.device, bytes = payload.len(), "datagram sent");
        Ok(())
    }

    async fn recv(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, source) = self.socket.recv_from(&mut buffer).await?;
            if source == self.device {
                buffer.truncate(len);
                return Ok(buffer);
            }
            debug!(%source, expected = %self.device, "dropping datagram from unexpected source");
        }
    }

    fn device_addr(&self) -> SocketAddr {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::assert_ok;

    async fn loopback_socket() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    #[tokio::test]
    async fn test_send_reaches_device() {
        let device = loopback_socket().await;
        let link = UdpLink::bind("127.0.0.1:0".parse().unwrap(), device.local_addr().unwrap())
            .await
            .unwrap();

        assert_ok!(link.send(br#"{"device":{"name":null}}"#).await);

        let mut buffer = [0u8; 128];
        let (len, source) = device.recv_from(&mut buffer).await.unwrap();
        assert_eq!(&buffer[..len], br#"{"device":{"name":null}}"#);
        assert_eq!(source, link.local_addr().unwrap());
    }

    #[tokio::test]
    async fn test_recv_filters_foreign_sources() {
        let device = loopback_socket().await;
        let stranger = loopback_socket().await;
        let link = UdpLink::bind("127.0.0.1:0".parse().unwrap(), device.local_addr().unwrap())
            .await
            .unwrap();
        let link_addr = link.local_addr().unwrap();

        stranger.send_to(b"noise", link_addr).await.unwrap();
        device.send_to(b"{\"rx1\":{}}", link_addr).await.unwrap();

        let received = tokio::time::timeout(Duration::from_secs(2), link.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received, b"{\"rx1\":{}}".to_vec());
    }
}
