use crate::{
    Result,
    constants::{MAX_CARD_ID_LENGTH, MIN_CARD_ID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Card identifier as read from the reader (uppercase hex string).
///
/// FeliCa cards carry an 8-byte IDm (16 digits); ISO14443 Type A cards
/// carry a 4-10 byte UID (8-20 digits).
///
/// # Security
/// This type implements constant-time comparison to prevent timing attacks
/// when matching card IDs against the allow list. Possession of an enrolled
/// ID is the whole access model, so the comparison is the sensitive step.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct CardId(String);

impl CardId {
    /// Create a card ID with validation.
    ///
    /// The ID is normalized (trimmed and converted to uppercase) before
    /// validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardId` if:
    /// - The length is not 8-20 hex digits
    /// - The length is odd (IDs encode whole bytes)
    /// - Any character is not a hex digit
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim().to_uppercase();

        let len = id.len();
        if !(MIN_CARD_ID_LENGTH..=MAX_CARD_ID_LENGTH).contains(&len) {
            return Err(Error::InvalidCardId(format!(
                "Card ID must be {MIN_CARD_ID_LENGTH}-{MAX_CARD_ID_LENGTH} hex digits, got {len}"
            )));
        }

        if len % 2 != 0 {
            return Err(Error::InvalidCardId(format!(
                "Card ID must encode whole bytes, got {len} digits"
            )));
        }

        if !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidCardId(
                "Card ID must be hexadecimal".to_string(),
            ));
        }

        Ok(CardId(id))
    }

    /// Encode raw ID bytes from the reader as a card ID.
    ///
    /// # Errors
    /// Returns `Error::InvalidCardId` if the byte count is outside 4-10.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        CardId::new(&hex)
    }

    /// Get the card ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CardId::new(s)
    }
}

/// Constant-time comparison implementation for CardId
///
/// This prevents timing attacks by ensuring comparison takes the same time
/// regardless of where the strings differ.
impl PartialEq for CardId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

/// Hash implementation for CardId
///
/// Implements standard hashing for use in hash-based collections.
impl std::hash::Hash for CardId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Card protocol family detected by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    /// FeliCa (JIS X 6319-4), polled first.
    Felica,
    /// ISO14443 Type A (Mifare family).
    TypeA,
}

impl CardKind {
    /// Human-readable name, as used in remote log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CardKind::Felica => "FeliCa",
            CardKind::TypeA => "TypeA",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Debounced, stable state of the physical door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Close,
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DoorState::Open => write!(f, "OPEN"),
            DoorState::Close => write!(f, "CLOSE"),
        }
    }
}

/// Top-level controller mode.
///
/// `Waiting` is the bounded post-unlock window during which a door
/// open-then-close cycle triggers the auto-relock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemMode {
    Normal,
    Waiting,
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SystemMode::Normal => write!(f, "NORMAL"),
            SystemMode::Waiting => write!(f, "WAITING"),
        }
    }
}

/// Lifecycle status of the card reader session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NfcStatus {
    /// Initialized and polling.
    Ok,
    /// Never initialized, or recovery exhausted. Only a process restart
    /// re-attempts bring-up from here.
    Disabled,
    /// Liveness probe failed; recovery in progress.
    Error,
}

impl fmt::Display for NfcStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NfcStatus::Ok => write!(f, "OK"),
            NfcStatus::Disabled => write!(f, "DISABLED"),
            NfcStatus::Error => write!(f, "ERROR"),
        }
    }
}
