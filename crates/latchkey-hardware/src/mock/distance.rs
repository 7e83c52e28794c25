//! Mock door distance sensor for testing and development.

use crate::{Result, traits::DistanceSensor, types::DistanceSample};
use std::sync::{Arc, Mutex};

/// Mock time-of-flight ranger.
///
/// Every `sample` call returns whatever reading the handle last set.
/// Starts with an invalid (out-of-range) reading, which the control core
/// treats as "door open".
#[derive(Debug)]
pub struct MockDistanceSensor {
    reading: Arc<Mutex<DistanceSample>>,
}

impl MockDistanceSensor {
    pub fn new() -> (Self, MockDistanceSensorHandle) {
        let reading = Arc::new(Mutex::new(DistanceSample::invalid()));

        let sensor = Self {
            reading: Arc::clone(&reading),
        };
        let handle = MockDistanceSensorHandle { reading };

        (sensor, handle)
    }
}

impl DistanceSensor for MockDistanceSensor {
    async fn sample(&mut self) -> Result<DistanceSample> {
        Ok(*self.reading.lock().expect("mock sensor poisoned"))
    }
}

/// Handle for controlling a mock distance sensor.
#[derive(Debug, Clone)]
pub struct MockDistanceSensorHandle {
    reading: Arc<Mutex<DistanceSample>>,
}

impl MockDistanceSensorHandle {
    /// Report a valid measurement of `millimeters` from now on.
    pub fn set_millimeters(&self, millimeters: u16) {
        *self.reading.lock().expect("mock sensor poisoned") = DistanceSample::valid(millimeters);
    }

    /// Report out-of-range / failed measurements from now on.
    pub fn set_invalid(&self) {
        *self.reading.lock().expect("mock sensor poisoned") = DistanceSample::invalid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sensor_tracks_handle() {
        let (mut sensor, handle) = MockDistanceSensor::new();

        assert!(!sensor.sample().await.unwrap().valid);

        handle.set_millimeters(25);
        let sample = sensor.sample().await.unwrap();
        assert!(sample.valid);
        assert_eq!(sample.millimeters, 25);

        handle.set_invalid();
        assert!(!sensor.sample().await.unwrap().valid);
    }
}
