//! Supervised TCP link to the remote command/audit endpoint.
//!
//! The link owns its own task and reconnects forever; the rest of the
//! system only ever touches three things: the command channel it feeds,
//! the [`LogPublisher`] it hands out, and the [`LinkStatus`] atomics it
//! keeps current. Nothing here can block the control loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, warn};

use latchkey_core::constants::{
    LINK_CHECK_INTERVAL, LINK_CONNECT_TIMEOUT, MAX_DATAGRAM_LEN,
};
use latchkey_core::log::LogSink;

/// Outbound log lines buffered while the link catches up.
const LOG_QUEUE_CAPACITY: usize = 64;

/// Configuration for the remote link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Remote endpoint to connect to.
    pub server_addr: SocketAddr,

    /// Timeout for a single connection attempt.
    pub connect_timeout: Duration,

    /// Pause between reconnection attempts.
    pub check_interval: Duration,
}

impl LinkConfig {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self {
            server_addr,
            connect_timeout: LINK_CONNECT_TIMEOUT,
            check_interval: LINK_CHECK_INTERVAL,
        }
    }
}

/// Shared link health, updated by the supervisor task and read by
/// everyone else. Plain relaxed atomics; readers only need an
/// eventually-current view.
#[derive(Debug)]
pub struct LinkStatus {
    connected: AtomicBool,
    reconnecting: AtomicBool,
    consecutive_failures: Arc<AtomicU32>,
}

impl LinkStatus {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            reconnecting: AtomicBool::new(false),
            consecutive_failures: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn is_reconnecting(&self) -> bool {
        self.reconnecting.load(Ordering::Relaxed)
    }

    /// Reconnection attempts since the last successful connect.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    /// Share the failure counter so the control loop can watch it
    /// without depending on this crate's types.
    pub fn failure_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.consecutive_failures)
    }
}

/// Best-effort sink that queues audit lines onto the link.
///
/// Publishing while disconnected is a silent no-op, and a full queue
/// drops the line rather than waiting. The control loop must never
/// stall on logging.
#[derive(Debug, Clone)]
pub struct LogPublisher {
    tx: mpsc::Sender<String>,
    status: Arc<LinkStatus>,
}

impl LogSink for LogPublisher {
    fn publish(&self, message: &str) {
        if !self.status.is_connected() {
            return;
        }
        if self.tx.try_send(message.to_string()).is_err() {
            debug!("log queue full, line dropped");
        }
    }
}

/// Handle to the supervised remote link.
///
/// Created with [`RemoteLink::spawn`]; dropping the handle aborts the
/// supervisor task.
pub struct RemoteLink {
    status: Arc<LinkStatus>,
    log_tx: mpsc::Sender<String>,
    task: JoinHandle<()>,
}

impl RemoteLink {
    /// Start the supervisor task. Inbound command lines are trimmed and
    /// forwarded to `command_tx`; outbound audit lines are accepted from
    /// the publisher returned by [`publisher`].
    ///
    /// [`publisher`]: RemoteLink::publisher
    pub fn spawn(config: LinkConfig, command_tx: mpsc::Sender<String>) -> Self {
        let (log_tx, log_rx) = mpsc::channel(LOG_QUEUE_CAPACITY);
        let status = Arc::new(LinkStatus::new());

        let task = tokio::spawn(supervise(config, command_tx, log_rx, Arc::clone(&status)));

        Self {
            status,
            log_tx,
            task,
        }
    }

    pub fn status(&self) -> Arc<LinkStatus> {
        Arc::clone(&self.status)
    }

    /// A cloneable best-effort sink feeding this link.
    pub fn publisher(&self) -> LogPublisher {
        LogPublisher {
            tx: self.log_tx.clone(),
            status: Arc::clone(&self.status),
        }
    }
}

impl Drop for RemoteLink {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Connect, serve, reconnect. Runs until the command receiver closes
/// or the task is aborted.
async fn supervise(
    config: LinkConfig,
    command_tx: mpsc::Sender<String>,
    mut log_rx: mpsc::Receiver<String>,
    status: Arc<LinkStatus>,
) {
    loop {
        status.reconnecting.store(true, Ordering::Relaxed);

        match tokio::time::timeout(
            config.connect_timeout,
            TcpStream::connect(config.server_addr),
        )
        .await
        {
            Ok(Ok(stream)) => {
                info!(addr = %config.server_addr, "link connected");
                if let Err(error) = stream.set_nodelay(true) {
                    warn!(%error, "failed to set TCP_NODELAY");
                }
                status.connected.store(true, Ordering::Relaxed);
                status.reconnecting.store(false, Ordering::Relaxed);
                status.consecutive_failures.store(0, Ordering::Relaxed);

                let mut framed =
                    Framed::new(stream, LinesCodec::new_with_max_length(MAX_DATAGRAM_LEN));
                // Announce ourselves on the audit feed; a failure here is
                // just an early disconnect.
                if let Err(error) = framed.send("Connected to remote endpoint".to_string()).await {
                    warn!(%error, "link greeting failed");
                }
                if serve(framed, &command_tx, &mut log_rx).await == ServeExit::Shutdown {
                    return;
                }

                status.connected.store(false, Ordering::Relaxed);
                warn!(addr = %config.server_addr, "link lost");
            }
            Ok(Err(error)) => {
                let failures = status.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(%error, failures, "link connect failed");
            }
            Err(_) => {
                let failures = status.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    timeout_ms = config.connect_timeout.as_millis() as u64,
                    failures, "link connect timed out"
                );
            }
        }

        tokio::time::sleep(config.check_interval).await;
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ServeExit {
    /// Connection dropped; the supervisor should reconnect.
    Disconnected,
    /// The command side of the system is gone; stop for good.
    Shutdown,
}

/// Pump one live connection in both directions.
async fn serve(
    mut framed: Framed<TcpStream, LinesCodec>,
    command_tx: &mpsc::Sender<String>,
    log_rx: &mut mpsc::Receiver<String>,
) -> ServeExit {
    loop {
        tokio::select! {
            inbound = framed.next() => match inbound {
                Some(Ok(line)) => {
                    let command = line.trim();
                    if command.is_empty() {
                        continue;
                    }
                    debug!(command, "remote command line");
                    if command_tx.send(command.to_string()).await.is_err() {
                        return ServeExit::Shutdown;
                    }
                }
                Some(Err(error)) => {
                    warn!(%error, "link read failed");
                    return ServeExit::Disconnected;
                }
                None => return ServeExit::Disconnected,
            },
            outbound = log_rx.recv() => match outbound {
                Some(line) => {
                    if let Err(error) = framed.send(line).await {
                        warn!(%error, "link write failed");
                        return ServeExit::Disconnected;
                    }
                }
                None => return ServeExit::Shutdown,
            },
        }
    }
}
