//! Lock servo motion sequences.

use latchkey_core::constants::{
    SERVO_CLOSE_DEG, SERVO_NEUTRAL_DEG, SERVO_OPEN_DEG, SERVO_SETTLE,
};
use latchkey_core::log::LogSink;
use latchkey_hardware::{LockServo, Result};

/// Drives the lock servo through its fixed unlock/lock sequences.
///
/// Every motion is a three-step sweep through the neutral angle so the
/// horn always returns to rest: neutral, extreme, neutral, with a
/// settle pause after each step. The sweep blocks the caller for the
/// full duration; the thumb-turn must finish moving before the loop
/// reacts to anything else.
#[derive(Debug)]
pub struct LockActuator<S: LockServo> {
    servo: S,
}

impl<S: LockServo> LockActuator<S> {
    pub fn new(servo: S) -> Self {
        Self { servo }
    }

    /// Turn the thumb-turn to the unlocked position and publish one
    /// audit line.
    pub async fn open<L: LogSink>(&mut self, log: &L) -> Result<()> {
        self.sweep(SERVO_OPEN_DEG).await?;
        log.publish("Door opened");
        Ok(())
    }

    /// Turn the thumb-turn to the locked position and publish one
    /// audit line.
    pub async fn close<L: LogSink>(&mut self, log: &L) -> Result<()> {
        self.sweep(SERVO_CLOSE_DEG).await?;
        log.publish("Door closed");
        Ok(())
    }

    async fn sweep(&mut self, extreme: u8) -> Result<()> {
        for angle in [SERVO_NEUTRAL_DEG, extreme, SERVO_NEUTRAL_DEG] {
            self.servo.set_angle(angle).await?;
            tokio::time::sleep(SERVO_SETTLE).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_core::log::MemoryLogSink;
    use latchkey_hardware::mock::MockServo;

    #[tokio::test(start_paused = true)]
    async fn open_sweeps_through_neutral() {
        let (servo, handle) = MockServo::new();
        let mut actuator = LockActuator::new(servo);
        let log = MemoryLogSink::new();

        actuator.open(&log).await.unwrap();

        assert_eq!(
            handle.angles(),
            vec![SERVO_NEUTRAL_DEG, SERVO_OPEN_DEG, SERVO_NEUTRAL_DEG]
        );
        assert_eq!(log.lines(), vec!["Door opened".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_sweeps_through_neutral() {
        let (servo, handle) = MockServo::new();
        let mut actuator = LockActuator::new(servo);
        let log = MemoryLogSink::new();

        actuator.close(&log).await.unwrap();

        assert_eq!(
            handle.angles(),
            vec![SERVO_NEUTRAL_DEG, SERVO_CLOSE_DEG, SERVO_NEUTRAL_DEG]
        );
        assert_eq!(log.lines(), vec!["Door closed".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn servo_failure_skips_audit_line() {
        let (servo, handle) = MockServo::new();
        handle.fail_next();
        let mut actuator = LockActuator::new(servo);
        let log = MemoryLogSink::new();

        assert!(actuator.open(&log).await.is_err());
        assert!(log.lines().is_empty());
    }
}
