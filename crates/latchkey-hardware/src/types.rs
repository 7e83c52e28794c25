//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum ISO14443A UID length in bytes.
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum ISO14443A UID length in bytes.
pub const MAX_UID_LENGTH: usize = 10;

/// FeliCa IDm length in bytes (always 8).
pub const FELICA_IDM_LENGTH: usize = 8;

/// One reading from the door distance sensor.
///
/// The driver flags out-of-range or failed measurements as invalid; an
/// invalid sample must never be interpreted as "door close", whatever the
/// reported distance says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceSample {
    /// Whether the measurement is usable.
    pub valid: bool,

    /// Measured distance in millimeters. Meaningless when `valid` is false.
    pub millimeters: u16,
}

impl DistanceSample {
    /// A usable measurement.
    #[must_use]
    pub fn valid(millimeters: u16) -> Self {
        Self {
            valid: true,
            millimeters,
        }
    }

    /// A failed or out-of-range measurement.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            valid: false,
            millimeters: u16::MAX,
        }
    }
}

/// Firmware version word read back from the reader chip.
///
/// Layout follows the PN532 GetFirmwareVersion response: IC code in the
/// top byte, then major and minor version. A chip that does not answer
/// yields no version at all rather than a zero word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareVersion(u32);

impl FirmwareVersion {
    /// Wrap a raw non-zero version word.
    ///
    /// Returns `None` for zero, which the chip protocol uses for "no
    /// response".
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// IC code (e.g. 0x32 for a PN532).
    #[must_use]
    pub fn ic(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Major firmware version.
    #[must_use]
    pub fn major(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Minor firmware version.
    #[must_use]
    pub fn minor(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Raw version word.
    #[must_use]
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "PN5{:02X} FW {}.{}", self.ic(), self.major(), self.minor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_sample_constructors() {
        let near = DistanceSample::valid(35);
        assert!(near.valid);
        assert_eq!(near.millimeters, 35);

        let bad = DistanceSample::invalid();
        assert!(!bad.valid);
    }

    #[test]
    fn test_firmware_version_fields() {
        let ver = FirmwareVersion::from_raw(0x3201_0600).unwrap();
        assert_eq!(ver.ic(), 0x32);
        assert_eq!(ver.major(), 1);
        assert_eq!(ver.minor(), 6);
        assert_eq!(ver.to_string(), "PN532 FW 1.6");
    }

    #[test]
    fn test_firmware_version_zero_is_no_response() {
        assert!(FirmwareVersion::from_raw(0).is_none());
    }
}
