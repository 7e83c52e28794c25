//! Mock latch servo for testing and development.

use crate::{HardwareError, Result, traits::LockServo};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ServoState {
    angles: Vec<u8>,
    fail_next: bool,
}

/// Mock servo that records every commanded angle.
///
/// Motion-sequence tests assert on the recorded angle history instead of
/// physical movement.
#[derive(Debug)]
pub struct MockServo {
    state: Arc<Mutex<ServoState>>,
}

impl MockServo {
    pub fn new() -> (Self, MockServoHandle) {
        let state = Arc::new(Mutex::new(ServoState::default()));

        let servo = Self {
            state: Arc::clone(&state),
        };
        let handle = MockServoHandle { state };

        (servo, handle)
    }
}

impl LockServo for MockServo {
    async fn set_angle(&mut self, degrees: u8) -> Result<()> {
        let mut state = self.state.lock().expect("mock servo poisoned");
        if state.fail_next {
            state.fail_next = false;
            return Err(HardwareError::communication("injected servo fault"));
        }
        state.angles.push(degrees);
        Ok(())
    }
}

/// Handle for inspecting a mock servo.
#[derive(Debug, Clone)]
pub struct MockServoHandle {
    state: Arc<Mutex<ServoState>>,
}

impl MockServoHandle {
    /// Every angle commanded so far, in order.
    pub fn angles(&self) -> Vec<u8> {
        self.state.lock().expect("mock servo poisoned").angles.clone()
    }

    /// Forget the recorded history.
    pub fn clear(&self) {
        self.state.lock().expect("mock servo poisoned").angles.clear();
    }

    /// Make the next `set_angle` call fail once.
    pub fn fail_next(&self) {
        self.state.lock().expect("mock servo poisoned").fail_next = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_angles_are_recorded_in_order() {
        let (mut servo, handle) = MockServo::new();

        servo.set_angle(90).await.unwrap();
        servo.set_angle(155).await.unwrap();
        servo.set_angle(90).await.unwrap();

        assert_eq!(handle.angles(), vec![90, 155, 90]);

        handle.clear();
        assert!(handle.angles().is_empty());
    }

    #[tokio::test]
    async fn test_injected_fault_fails_once() {
        let (mut servo, handle) = MockServo::new();

        handle.fail_next();
        assert!(servo.set_angle(90).await.is_err());
        assert!(servo.set_angle(90).await.is_ok());
        assert_eq!(handle.angles(), vec![90]);
    }
}
