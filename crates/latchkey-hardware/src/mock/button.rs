//! Mock front-panel button for testing and development.

use crate::{Result, traits::ButtonInput};
use std::sync::{Arc, Mutex};

/// Mock edge-triggered button.
///
/// Each `press` on the handle queues exactly one edge; `was_pressed`
/// consumes one edge per call, matching the real input's
/// read-once-per-press contract.
#[derive(Debug)]
pub struct MockButton {
    pending: Arc<Mutex<u32>>,
}

impl MockButton {
    pub fn new() -> (Self, MockButtonHandle) {
        let pending = Arc::new(Mutex::new(0));

        let button = Self {
            pending: Arc::clone(&pending),
        };
        let handle = MockButtonHandle { pending };

        (button, handle)
    }
}

impl ButtonInput for MockButton {
    async fn was_pressed(&mut self) -> Result<bool> {
        let mut pending = self.pending.lock().expect("mock button poisoned");
        if *pending > 0 {
            *pending -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Handle for controlling a mock button.
#[derive(Debug, Clone)]
pub struct MockButtonHandle {
    pending: Arc<Mutex<u32>>,
}

impl MockButtonHandle {
    /// Queue one press edge.
    pub fn press(&self) {
        *self.pending.lock().expect("mock button poisoned") += 1;
    }
}
