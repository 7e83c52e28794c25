//! Card reader session layer for the latchkey smart-lock controller.
//!
//! This crate sits between the raw [`NfcDriver`](latchkey_hardware::NfcDriver)
//! bus trait and the control core. It owns the reader's lifecycle
//! (bring-up with bounded retries, periodic liveness checks, recovery or
//! permanent disable) and suppresses the rapid repeat reads a card in the
//! field produces, so the core only ever sees fresh presentations.

pub mod dedup;
pub mod session;

pub use dedup::{CardDeduplicator, CardRecord};
pub use session::{CardDetection, ReaderSession};
