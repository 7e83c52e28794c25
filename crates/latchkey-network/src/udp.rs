//! Connectionless datagram channel for local commands.
//!
//! LAN peers can steer the latch without going through the remote
//! endpoint: one command token per datagram, nothing comes back.

use std::io;
use std::net::SocketAddr;

use tokio::net::{ToSocketAddrs, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use latchkey_core::constants::MAX_DATAGRAM_LEN;

/// Listens for command datagrams and forwards their payloads.
///
/// Payloads are decoded lossily as UTF-8 and trimmed; empty datagrams
/// are ignored. Anything longer than [`MAX_DATAGRAM_LEN`] is truncated,
/// which can only mangle garbage since valid commands are short.
pub struct UdpCommandListener {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpCommandListener {
    /// Bind the listener. Use port 0 to pick an ephemeral port, e.g.
    /// in tests.
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        let local_addr = socket.local_addr()?;
        info!(%local_addr, "UDP command listener bound");
        Ok(Self { socket, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Run the receive loop on its own task, forwarding command text to
    /// `command_tx`. The task ends when the receiver side closes.
    pub fn spawn(self, command_tx: mpsc::Sender<String>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_LEN];
            loop {
                match self.socket.recv_from(&mut buf).await {
                    Ok((len, peer)) => {
                        let payload = String::from_utf8_lossy(&buf[..len]);
                        let command = payload.trim();
                        if command.is_empty() {
                            continue;
                        }
                        debug!(%peer, command, "datagram command");
                        if command_tx.send(command.to_string()).await.is_err() {
                            return;
                        }
                    }
                    Err(error) => {
                        warn!(%error, "UDP receive failed");
                    }
                }
            }
        })
    }
}
