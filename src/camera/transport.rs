//! Fire-and-forget delivery of VISCA packets
//!
//! Each command is one complete write: a fresh TCP connection that is shut
//! down after the packet, or a single UDP datagram. No reply is read. Every
//! send is bounded by a timeout so an unreachable camera costs at most that
//! long per command.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::OnceCell;
use tokio::time::timeout;
use tracing::debug;

use super::target::{CameraTarget, Transport};
use crate::visca::Command;

/// Connect-and-send budget for one command
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connect, write or bind failed
    #[error("Socket error to {target}: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// The whole send did not finish within the budget
    #[error("Send to {target} timed out after {after:?}")]
    Timeout { target: String, after: Duration },
}

/// Boxed send future; not `Send`, the loop runs on one task
pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<(), TransportError>> + 'a>>;

/// Delivers one encoded command to one camera.
///
/// Each call is a complete, independent write; no reply is read.
pub trait CommandTransport {
    fn send<'a>(&'a self, target: &'a CameraTarget, command: &'a Command) -> SendFuture<'a>;
}

/// Sends packets over real sockets.
///
/// TCP opens a fresh connection per command. UDP shares one unbound-port socket.
#[derive(Debug)]
pub struct NetworkTransport {
    send_timeout: Duration,
    udp_socket: OnceCell<UdpSocket>,
}

impl NetworkTransport {
    /// Transport whose sends give up after `send_timeout`
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            send_timeout,
            udp_socket: OnceCell::new(),
        }
    }

    /// Connects, writes the packet and closes the write half
    async fn send_tcp(&self, target: &CameraTarget, packet: &[u8]) -> std::io::Result<()> {
        let mut stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
        stream.set_nodelay(true)?;
        stream.write_all(packet).await?;
        stream.shutdown().await
    }

    /// Sends one datagram from the shared socket, binding it on first use
    async fn send_udp(&self, target: &CameraTarget, packet: &[u8]) -> std::io::Result<()> {
        let socket = self
            .udp_socket
            .get_or_try_init(|| UdpSocket::bind(("0.0.0.0", 0)))
            .await?;
        socket
            .send_to(packet, (target.host.as_str(), target.port))
            .await?;
        Ok(())
    }
}

impl Default for NetworkTransport {
    fn default() -> Self {
        Self::new(DEFAULT_SEND_TIMEOUT)
    }
}

impl CommandTransport for NetworkTransport {
    fn send<'a>(&'a self, target: &'a CameraTarget, command: &'a Command) -> SendFuture<'a> {
        Box::pin(async move {
            debug!("Sending {} to {}", command, target);

            let attempt = async {
                match target.transport {
                    Transport::Tcp => self.send_tcp(target, command.packet()).await,
                    Transport::Udp => self.send_udp(target, command.packet()).await,
                }
            };

            match timeout(self.send_timeout, attempt).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(source)) => Err(TransportError::Io {
                    target: target.to_string(),
                    source,
                }),
                Err(_) => Err(TransportError::Timeout {
                    target: target.to_string(),
                    after: self.send_timeout,
                }),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visca::{encode_autofocus_trigger, encode_stop};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn udp_delivers_one_datagram_per_command() {
        let camera = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = camera.local_addr().unwrap().port();
        let target = CameraTarget::new("127.0.0.1", Transport::Udp, Some(port));
        let transport = NetworkTransport::default();

        transport.send(&target, &encode_stop()).await.unwrap();
        transport
            .send(&target, &encode_autofocus_trigger())
            .await
            .unwrap();

        let mut buf = [0u8; 32];
        let len = camera.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], encode_stop().packet());
        let len = camera.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], encode_autofocus_trigger().packet());
    }

    #[tokio::test]
    async fn tcp_writes_the_packet() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let target = CameraTarget::new("127.0.0.1", Transport::Tcp, Some(port));

        let camera = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        NetworkTransport::default()
            .send(&target, &encode_stop())
            .await
            .unwrap();

        assert_eq!(camera.await.unwrap(), encode_stop().packet());
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = CameraTarget::new("127.0.0.1", Transport::Tcp, Some(port));
        let result = NetworkTransport::default()
            .send(&target, &encode_stop())
            .await;

        assert!(matches!(result, Err(TransportError::Io { .. })));
    }
}
