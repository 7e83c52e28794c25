//! Best-effort remote log sink.
//!
//! State transitions publish short human-readable lines to a remote channel
//! (the appliance's audit feed). Delivery is best-effort: when the channel
//! is down the line is dropped, and a publish never blocks the control loop.
//! Local diagnostics go through `tracing` instead; the two are deliberately
//! separate concerns.

use std::sync::{Arc, Mutex};

/// Outbound log line sink.
///
/// Implementations must be cheap and non-blocking; the control loop calls
/// `publish` from inside the tick.
pub trait LogSink: Send + Sync {
    /// Publish one log line, best-effort.
    fn publish(&self, message: &str);
}

/// Sink that discards everything. Useful when running without a link.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn publish(&self, _message: &str) {}
}

/// Sink that records lines in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line published so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log sink poisoned").clone()
    }

    /// True if any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    /// Number of recorded lines equal to `line`.
    pub fn count_of(&self, line: &str) -> usize {
        self.lines().iter().filter(|l| l.as_str() == line).count()
    }
}

impl LogSink for MemoryLogSink {
    fn publish(&self, message: &str) {
        self.lines
            .lock()
            .expect("log sink poisoned")
            .push(message.to_string());
    }
}
