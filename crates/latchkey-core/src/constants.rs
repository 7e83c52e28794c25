//! Timing and identification constants for the smart-lock controller.
//!
//! Every duration here is load-bearing for physical correctness: the servo
//! settle time and motion angles must match the installed linkage, and the
//! debounce/cooldown windows are tuned against the real sensor and reader
//! hardware. Treat changes as hardware changes, not software tuning.

use std::time::Duration;

// ============================================================================
// Door sensing
// ============================================================================

/// Distance below which the proximity sensor reading counts as "door close".
///
/// The VL53L0X-class sensor faces the door edge; anything nearer than this
/// is the closed door. Readings flagged invalid by the driver never count
/// as close regardless of the reported distance.
pub const CLOSE_DISTANCE_MM: u16 = 40;

/// Continuous run of "close" samples required before committing `Close`.
///
/// Only closings are debounced. Open transitions commit immediately so the
/// controller stays responsive while the door is in use.
pub const DOOR_CLOSE_DEBOUNCE: Duration = Duration::from_millis(2000);

// ============================================================================
// Card reader
// ============================================================================

/// Minimum elapsed time before a repeat read of the same card is treated
/// as a new presentation rather than card-still-in-field noise.
pub const CARD_COOLDOWN: Duration = Duration::from_millis(2000);

/// Per-protocol poll timeout. Two polls per check keep the worst case
/// around 20ms, well inside the tick budget.
pub const CARD_POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Settle delay after waking the reader chip, before the first version read.
pub const NFC_INIT_SETTLE: Duration = Duration::from_millis(100);

/// Delay between failed bring-up attempts.
pub const NFC_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Default bring-up attempt budget.
pub const DEFAULT_NFC_INIT_RETRIES: u32 = 3;

/// Cadence of card polling in the tick loop.
pub const NFC_POLL_INTERVAL: Duration = Duration::from_millis(150);

/// Cadence of reader liveness checks (skipped while the reader is disabled).
pub const NFC_CHECK_INTERVAL: Duration = Duration::from_secs(10);

// ============================================================================
// Remote link
// ============================================================================

/// Cadence of link liveness/reconnect checks in the supervisor task.
pub const LINK_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on a single reconnect attempt.
pub const LINK_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default port for the connectionless datagram command channel.
pub const DEFAULT_UDP_PORT: u16 = 4210;

/// Maximum accepted datagram payload. Commands are short tokens; anything
/// larger is noise.
pub const MAX_DATAGRAM_LEN: usize = 256;

// ============================================================================
// Failure policy
// ============================================================================

/// Consecutive failures of a periodic health check (reader liveness or link
/// reconnect) after which the condition is treated as unrecoverable and the
/// process is restarted.
pub const CONSECUTIVE_ERROR_CEILING: u32 = 5;

// ============================================================================
// Lock actuator
// ============================================================================

/// Settle delay after each servo step of a motion sequence.
pub const SERVO_SETTLE: Duration = Duration::from_millis(600);

/// Rest position between motions.
pub const SERVO_NEUTRAL_DEG: u8 = 90;

/// Extreme reached during the open motion.
pub const SERVO_OPEN_DEG: u8 = 155;

/// Extreme reached during the close motion.
pub const SERVO_CLOSE_DEG: u8 = 15;

// ============================================================================
// Mode machine
// ============================================================================

/// Length of the post-unlock waiting window. When it elapses with no
/// observed door cycle the system reverts to normal monitoring without
/// actuating the lock.
pub const WAITING_TIMEOUT: Duration = Duration::from_millis(15000);

// ============================================================================
// Scheduling
// ============================================================================

/// Tick interval of the main control loop.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Cadence of display snapshot publication.
pub const DISPLAY_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Command tokens
// ============================================================================

/// Unlock command token, case-sensitive.
pub const CMD_OPEN_LOCK: &str = "openlock";

/// Lock command token, case-sensitive.
pub const CMD_CLOSE_LOCK: &str = "closelock";

// ============================================================================
// Card ID format
// ============================================================================

/// Minimum card ID length in hex digits (4-byte ISO14443A UID).
pub const MIN_CARD_ID_LENGTH: usize = 8;

/// Maximum card ID length in hex digits (10-byte ISO14443A UID; FeliCa IDm
/// is always 16 digits).
pub const MAX_CARD_ID_LENGTH: usize = 20;
