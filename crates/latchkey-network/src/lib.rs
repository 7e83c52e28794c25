//! Remote channels for the latch appliance.
//!
//! Two inbound paths deliver command text to the controller, and one
//! outbound path carries audit log lines:
//!
//! ```text
//! remote endpoint ──(TCP, line-framed)──> RemoteLink ──┐
//!                                                      ├──> command mpsc ──> Controller
//! LAN peers ──────(UDP datagrams)──────> UdpCommandListener ──┘
//!
//! Controller ──> LogPublisher ──(bounded queue)──> RemoteLink ──(TCP)──> remote endpoint
//! ```
//!
//! The TCP link is supervised: it reconnects on its own schedule,
//! tracks health in plain atomics, and never blocks the control loop.
//! Log delivery is best-effort by design; a disconnected link drops
//! lines silently.

pub mod link;
pub mod udp;

pub use link::{LinkConfig, LinkStatus, LogPublisher, RemoteLink};
pub use udp::UdpCommandListener;
