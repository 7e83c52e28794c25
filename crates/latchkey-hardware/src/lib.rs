//! Hardware abstraction layer for the latchkey smart-lock controller.
//!
//! This crate provides trait-based abstractions for the appliance's four
//! peripherals: the NFC reader chip, the time-of-flight distance sensor
//! watching the door, the latch servo, and the front-panel button. The
//! traits enable substitution between mock implementations (development,
//! tests) and real bus drivers without touching the control core.
//!
//! # Design Philosophy
//!
//! - **Async-first**: all I/O operations are asynchronous using native
//!   `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Polling-shaped**: the control loop polls; every trait method is
//!   expected to return within a short bound (the NFC polls take an
//!   explicit timeout, the rest are effectively immediate reads).
//! - **Error-aware**: all operations return `Result<T>` with a
//!   [`HardwareError`]; a failed poll is transient, not fatal.
//!
//! # Example
//!
//! ```no_run
//! use latchkey_hardware::traits::DistanceSensor;
//! use latchkey_hardware::error::Result;
//!
//! async fn door_is_near<S: DistanceSensor>(sensor: &mut S) -> Result<bool> {
//!     let sample = sensor.sample().await?;
//!     Ok(sample.valid && sample.millimeters < 40)
//! }
//! ```

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use traits::{ButtonInput, DistanceSensor, LockServo, NfcDriver};
pub use types::{DistanceSample, FirmwareVersion};
