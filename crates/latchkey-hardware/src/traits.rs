//! Hardware device trait definitions.
//!
//! These traits establish the contract between the control core and the
//! appliance's peripherals, enabling substitution between mock and real
//! bus implementations. All traits use native `async fn` methods
//! (Rust 1.90 + Edition 2024 RPITIT), so no `async_trait` macro is needed.
//!
//! # Object Safety and Dynamic Dispatch
//!
//! These traits are NOT object-safe: `async fn` methods return
//! `impl Future`, an opaque type unusable in trait objects. Use generic
//! type parameters instead:
//!
//! ```no_run
//! use latchkey_hardware::traits::LockServo;
//! use latchkey_hardware::error::Result;
//!
//! async fn park<S: LockServo>(servo: &mut S) -> Result<()> {
//!     servo.set_angle(90).await
//! }
//! ```

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::DistanceSample;
use crate::types::FirmwareVersion;
use std::time::Duration;

/// NFC reader chip abstraction (PN532-class device on a slow bus).
///
/// The session layer above this trait owns lifecycle, retry, and
/// deduplication policy; the driver only moves bytes. A poll that finds no
/// card within its timeout is `Ok(None)`, not an error — errors mean the
/// bus transaction itself failed.
pub trait NfcDriver: Send + Sync {
    /// Wake the chip and prepare the bus for commands.
    ///
    /// Called at the start of every bring-up attempt; must be safe to call
    /// repeatedly, including after a previous attempt failed mid-way.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn wake(&mut self) -> Result<()>;

    /// Read the chip's firmware version word.
    ///
    /// Doubles as the liveness probe: a healthy chip always answers.
    /// Returns `Ok(None)` when the chip does not respond.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>>;

    /// Configure passive activation retries and the secure access module.
    ///
    /// Called exactly once per successful bring-up, after the version read.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn configure(&mut self) -> Result<()>;

    /// Poll for a FeliCa card, returning its 8-byte IDm if one is in the
    /// field within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn poll_felica(&mut self, timeout: Duration) -> Result<Option<[u8; 8]>>;

    /// Poll for an ISO14443 Type A card, returning its 4-10 byte UID if
    /// one is in the field within `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn poll_type_a(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>>;
}

/// Door distance sensor abstraction (VL53L0X-class time-of-flight ranger).
pub trait DistanceSensor: Send + Sync {
    /// Take one ranging measurement.
    ///
    /// Out-of-range and failed measurements come back as samples with
    /// `valid == false` rather than errors; an error means the sensor
    /// itself could not be reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transaction fails.
    async fn sample(&mut self) -> Result<DistanceSample>;
}

/// Latch servo abstraction.
///
/// The actuator layer owns motion sequencing and settle timing; the servo
/// only takes target angles.
pub trait LockServo: Send + Sync {
    /// Command the servo to the given angle in degrees.
    ///
    /// Returns as soon as the command is issued; the caller is responsible
    /// for settle delays.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be issued.
    async fn set_angle(&mut self, degrees: u8) -> Result<()>;
}

/// Front-panel button abstraction.
pub trait ButtonInput: Send + Sync {
    /// Edge-triggered press query, polled once per tick.
    ///
    /// Returns `true` at most once per physical press; a held button does
    /// not retrigger.
    ///
    /// # Errors
    ///
    /// Returns an error if the input state cannot be read.
    async fn was_pressed(&mut self) -> Result<bool>;
}
