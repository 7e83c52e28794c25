//! Mock device implementations for testing and development.
//!
//! This module provides simulated peripherals that can be controlled
//! programmatically without physical hardware. Each mock comes as a
//! (device, handle) pair: the device implements the peripheral trait and
//! goes to the controller, the handle stays with the test and drives the
//! simulation.

pub mod button;
pub mod distance;
pub mod nfc;
pub mod servo;

// Re-export commonly used types
pub use button::{MockButton, MockButtonHandle};
pub use distance::{MockDistanceSensor, MockDistanceSensorHandle};
pub use nfc::{MockNfcDriver, MockNfcHandle};
pub use servo::{MockServo, MockServoHandle};
