//! Card reader session lifecycle.
//!
//! The session wraps an [`NfcDriver`] and tracks the reader chip's health:
//!
//! - `Disabled` (initial) → `Ok` after a successful `begin`
//! - `Ok` → `Error` when a liveness probe fails
//! - `Error` → `Ok` (probe recovered, or bounded re-begin succeeded)
//! - `Error` → `Disabled` (recovery exhausted)
//!
//! Once `Disabled`, nothing re-attempts bring-up except a process restart.
//! Flapping health (probes that keep failing while re-begin keeps
//! succeeding) is surfaced through a consecutive-error counter the
//! orchestrator turns into a fatal restart.

use crate::dedup::CardDeduplicator;
use latchkey_core::{
    CardId, CardKind, NfcStatus,
    constants::{CARD_POLL_TIMEOUT, NFC_INIT_SETTLE, NFC_RETRY_DELAY},
};
use latchkey_hardware::{FirmwareVersion, NfcDriver};
use std::time::Instant;
use tracing::{debug, info, warn};

/// A fresh card presentation surfaced to the control core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetection {
    pub kind: CardKind,
    pub id: CardId,
}

/// Owns the reader chip driver and its lifecycle state.
pub struct ReaderSession<D: NfcDriver> {
    driver: D,
    status: NfcStatus,
    firmware: Option<FirmwareVersion>,
    consecutive_errors: u32,
    dedup: CardDeduplicator,
}

impl<D: NfcDriver> ReaderSession<D> {
    /// Create a session around a driver. Starts `Disabled` until `begin`
    /// succeeds.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            status: NfcStatus::Disabled,
            firmware: None,
            consecutive_errors: 0,
            dedup: CardDeduplicator::new(),
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> NfcStatus {
        self.status
    }

    /// Firmware version read at the last successful bring-up.
    pub fn firmware(&self) -> Option<FirmwareVersion> {
        self.firmware
    }

    /// Consecutive failed liveness probes. Reset by any successful probe.
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Kind and ID of the last fresh detection, for status display.
    pub fn last_card(&self) -> Option<(CardKind, CardId)> {
        self.dedup.last().map(|r| (r.kind, r.id.clone()))
    }

    /// Attempt hardware bring-up, up to `max_retries` times.
    ///
    /// An attempt wakes the chip, lets it settle, and reads the firmware
    /// version; a response proves the chip is alive, after which activation
    /// retries and the SAM are configured and the session is `Ok`. On
    /// exhaustion the session is `Disabled` — a non-fatal outcome, the
    /// system continues with card access off.
    pub async fn begin(&mut self, max_retries: u32) -> bool {
        for attempt in 1..=max_retries {
            match self.try_bring_up().await {
                Some(version) => {
                    info!(%version, "NFC reader initialized");
                    self.firmware = Some(version);
                    self.status = NfcStatus::Ok;
                    return true;
                }
                None => {
                    debug!(attempt, max_retries, "NFC init attempt failed, retrying");
                    tokio::time::sleep(NFC_RETRY_DELAY).await;
                }
            }
        }

        warn!(max_retries, "NFC init failed after retries, reader disabled");
        self.status = NfcStatus::Disabled;
        false
    }

    async fn try_bring_up(&mut self) -> Option<FirmwareVersion> {
        if let Err(error) = self.driver.wake().await {
            debug!(%error, "NFC wake failed");
            return None;
        }
        tokio::time::sleep(NFC_INIT_SETTLE).await;

        let version = match self.driver.firmware_version().await {
            Ok(Some(version)) => version,
            Ok(None) => return None,
            Err(error) => {
                debug!(%error, "NFC version read failed");
                return None;
            }
        };

        if let Err(error) = self.driver.configure().await {
            debug!(%error, "NFC configure failed");
            return None;
        }

        Some(version)
    }

    /// Periodic liveness check, invoked by the orchestrator every 10s
    /// while not `Disabled`.
    ///
    /// A failed probe moves the session to `Error` and attempts a bounded
    /// re-`begin`; success restores `Ok`, exhaustion moves to `Disabled`.
    /// Returns whether the session ended the check healthy.
    pub async fn ensure_connection(&mut self) -> bool {
        if self.status == NfcStatus::Disabled {
            return false;
        }

        match self.driver.firmware_version().await {
            Ok(Some(_)) => {
                if self.status == NfcStatus::Error {
                    info!("NFC reader recovered");
                }
                self.status = NfcStatus::Ok;
                self.consecutive_errors = 0;
                true
            }
            Ok(None) | Err(_) => {
                self.consecutive_errors += 1;
                self.status = NfcStatus::Error;
                warn!(
                    consecutive_errors = self.consecutive_errors,
                    "NFC connection lost, attempting to reconnect"
                );

                if self.begin(latchkey_core::constants::DEFAULT_NFC_INIT_RETRIES).await {
                    info!("NFC reader reconnected");
                    true
                } else {
                    warn!("NFC reconnection failed, reader disabled");
                    false
                }
            }
        }
    }

    /// Poll for a fresh card presentation. Only meaningful when `Ok`.
    ///
    /// Polls the two card families in fixed priority order (FeliCa first),
    /// each with a short timeout so the tick loop is never stalled. A
    /// detection the deduplicator recognizes as the same card still in the
    /// field yields nothing. Single failed polls are transient and logged
    /// at debug level only.
    pub async fn check_card(&mut self, now: Instant) -> Option<CardDetection> {
        if self.status != NfcStatus::Ok {
            return None;
        }

        match self.driver.poll_felica(CARD_POLL_TIMEOUT).await {
            Ok(Some(idm)) => {
                if let Ok(id) = CardId::from_bytes(&idm)
                    && self.dedup.observe(CardKind::Felica, &id, now)
                {
                    return Some(CardDetection {
                        kind: CardKind::Felica,
                        id,
                    });
                }
            }
            Ok(None) => {}
            Err(error) => debug!(%error, "FeliCa poll failed"),
        }

        match self.driver.poll_type_a(CARD_POLL_TIMEOUT).await {
            Ok(Some(uid)) => {
                if let Ok(id) = CardId::from_bytes(&uid)
                    && self.dedup.observe(CardKind::TypeA, &id, now)
                {
                    return Some(CardDetection {
                        kind: CardKind::TypeA,
                        id,
                    });
                }
            }
            Ok(None) => {}
            Err(error) => debug!(%error, "Type A poll failed"),
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_hardware::mock::MockNfcDriver;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_begin_succeeds_and_configures() {
        let (driver, handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);

        assert_eq!(session.status(), NfcStatus::Disabled);
        assert!(session.begin(3).await);
        assert_eq!(session.status(), NfcStatus::Ok);
        assert_eq!(handle.wake_count(), 1);
        assert_eq!(handle.configure_count(), 1);
        assert!(session.firmware().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_exhaustion_disables() {
        let (driver, handle) = MockNfcDriver::new();
        handle.set_online(false);
        let mut session = ReaderSession::new(driver);

        assert!(!session.begin(3).await);
        assert_eq!(session.status(), NfcStatus::Disabled);
        assert_eq!(handle.wake_count(), 3);
        assert_eq!(handle.configure_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_connection_skipped_when_disabled() {
        let (driver, handle) = MockNfcDriver::new();
        handle.set_online(false);
        let mut session = ReaderSession::new(driver);
        session.begin(1).await;

        assert!(!session.ensure_connection().await);
        assert_eq!(session.consecutive_errors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_connection_healthy_resets_counter() {
        let (driver, _handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);
        session.begin(3).await;

        assert!(session.ensure_connection().await);
        assert_eq!(session.status(), NfcStatus::Ok);
        assert_eq!(session.consecutive_errors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_connection_loss_disables_after_failed_recovery() {
        let (driver, handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);
        session.begin(3).await;

        handle.set_online(false);
        assert!(!session.ensure_connection().await);
        assert_eq!(session.status(), NfcStatus::Disabled);
        assert_eq!(session.consecutive_errors(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flapping_probes_accumulate_consecutive_errors() {
        let (driver, handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);
        session.begin(3).await;

        // Each cycle the liveness probe goes unanswered but the re-begin
        // succeeds: the session keeps flapping Ok->Error->Ok and the
        // counter climbs, since only a clean probe resets it.
        for cycle in 1..=5 {
            handle.fail_probes(1);
            assert!(session.ensure_connection().await);
            assert_eq!(session.status(), NfcStatus::Ok);
            assert_eq!(session.consecutive_errors(), cycle);
        }

        assert!(session.ensure_connection().await);
        assert_eq!(session.consecutive_errors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_card_deduplicates_until_cooldown() {
        let (driver, handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);
        session.begin(3).await;

        handle.present_felica([0x01, 0x2E, 0x3D, 0x4C, 0x5B, 0x6A, 0x79, 0x88]);
        let t0 = Instant::now();

        let first = session.check_card(t0).await.unwrap();
        assert_eq!(first.kind, CardKind::Felica);
        assert_eq!(first.id.as_str(), "012E3D4C5B6A7988");

        // Same card still in the field: suppressed.
        assert!(session.check_card(t0 + Duration::from_millis(150)).await.is_none());
        assert!(session.check_card(t0 + Duration::from_millis(1950)).await.is_none());

        // Cooldown elapsed: re-triggers.
        assert!(session.check_card(t0 + Duration::from_millis(2000)).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_card_type_a_uppercase_hex() {
        let (driver, handle) = MockNfcDriver::new();
        let mut session = ReaderSession::new(driver);
        session.begin(3).await;

        handle.present_type_a(vec![0x04, 0xab, 0xcd, 0xef]);
        let detection = session.check_card(Instant::now()).await.unwrap();
        assert_eq!(detection.kind, CardKind::TypeA);
        assert_eq!(detection.id.as_str(), "04ABCDEF");
        assert_eq!(
            session.last_card().map(|(_, id)| id.as_str().to_string()),
            Some("04ABCDEF".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_card_requires_ok_status() {
        let (driver, handle) = MockNfcDriver::new();
        handle.set_online(false);
        let mut session = ReaderSession::new(driver);
        session.begin(1).await;

        handle.present_type_a(vec![0x04, 0xAB, 0xCD, 0xEF]);
        assert!(session.check_card(Instant::now()).await.is_none());
    }
}
