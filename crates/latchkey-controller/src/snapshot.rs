//! Display snapshot published by the control loop.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use latchkey_core::types::{CardId, CardKind, DoorState, NfcStatus, SystemMode};

/// The most recently accepted card, kept for the status display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastCard {
    pub kind: CardKind,
    pub id: CardId,
}

/// Point-in-time view of the appliance for display and diagnostics.
///
/// Published on a watch channel roughly every 100ms; consumers only
/// ever see the latest value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub mode: SystemMode,
    /// Whole seconds left in the waiting window, `None` in NORMAL.
    pub remaining_seconds: Option<u64>,
    pub door: DoorState,
    pub reader: NfcStatus,
    pub last_card: Option<LastCard>,
    pub captured_at: DateTime<Utc>,
}

impl DisplaySnapshot {
    pub fn initial() -> Self {
        Self {
            mode: SystemMode::Normal,
            remaining_seconds: None,
            door: DoorState::Open,
            reader: NfcStatus::Disabled,
            last_card: None,
            captured_at: Utc::now(),
        }
    }
}

impl fmt::Display for DisplaySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remaining_seconds {
            Some(secs) => write!(f, "{} ({secs}s)", self.mode)?,
            None => write!(f, "{}", self.mode)?,
        }
        write!(f, " | door {} | nfc {}", self.door, self.reader)?;
        if let Some(card) = &self.last_card {
            // FeliCa IDms fit, but long Type A UIDs would blow the line width.
            let id = card.id.as_str();
            let shown = &id[..id.len().min(12)];
            write!(f, " | last {} {shown}", card.kind.as_str())?;
        }
        Ok(())
    }
}
