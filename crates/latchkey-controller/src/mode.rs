//! NORMAL/WAITING mode state machine.
//!
//! The waiting window opens after every unlock. While it is open the
//! machine watches door transitions: once it has seen the door swing
//! open, the next close means someone went through and the lock should
//! re-engage. If nothing happens for the whole window, it simply
//! expires.

use std::time::{Duration, Instant};

use latchkey_core::constants::WAITING_TIMEOUT;
use latchkey_core::types::SystemMode;

use crate::debounce::DoorEdge;

/// Outcome of one waiting-window tick that the caller must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    /// The window expired without a completed passage.
    TimedOut,
    /// The door swung open inside the window.
    SawOpen,
    /// The door closed after having opened inside the window; the
    /// machine is back in NORMAL and the lock should re-engage.
    AutoRelock,
}

/// Tracks the current [`SystemMode`] and the waiting-window bookkeeping.
#[derive(Debug)]
pub struct ModeMachine {
    mode: SystemMode,
    entered_at: Option<Instant>,
    saw_open: bool,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self {
            mode: SystemMode::Normal,
            entered_at: None,
            saw_open: false,
        }
    }

    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    /// Whether the waiting window has already seen the door open.
    pub fn saw_open(&self) -> bool {
        self.saw_open
    }

    /// Time left in the waiting window, `None` in NORMAL.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let entered = self.entered_at?;
        Some(WAITING_TIMEOUT.saturating_sub(now.duration_since(entered)))
    }

    /// Open a fresh waiting window. Re-entering while already waiting
    /// restarts the window and forgets any open seen so far.
    pub fn enter_waiting(&mut self, now: Instant) {
        self.mode = SystemMode::Waiting;
        self.entered_at = Some(now);
        self.saw_open = false;
    }

    /// Leave the waiting window without re-engaging the lock.
    pub fn exit_waiting(&mut self) {
        self.mode = SystemMode::Normal;
        self.entered_at = None;
        self.saw_open = false;
    }

    /// Advance the waiting window by one tick.
    ///
    /// `edge` is the door transition committed on this tick, if any.
    /// Expiry is checked before the edge, so a transition arriving on
    /// the same tick the window runs out is ignored.
    pub fn tick(&mut self, edge: Option<DoorEdge>, now: Instant) -> Option<ModeEvent> {
        if self.mode != SystemMode::Waiting {
            return None;
        }
        let entered = self.entered_at?;

        if now.duration_since(entered) >= WAITING_TIMEOUT {
            self.exit_waiting();
            return Some(ModeEvent::TimedOut);
        }

        match edge {
            Some(DoorEdge::Opened) => {
                self.saw_open = true;
                Some(ModeEvent::SawOpen)
            }
            Some(DoorEdge::Closed) if self.saw_open => {
                self.exit_waiting();
                Some(ModeEvent::AutoRelock)
            }
            _ => None,
        }
    }
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self::new()
    }
}
