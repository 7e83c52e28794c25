//! The central control loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use latchkey_core::command::Command;
use latchkey_core::constants::{
    CONSECUTIVE_ERROR_CEILING, DEFAULT_NFC_INIT_RETRIES, DISPLAY_REFRESH_INTERVAL,
    NFC_CHECK_INTERVAL, NFC_POLL_INTERVAL, TICK_INTERVAL,
};
use latchkey_core::log::LogSink;
use latchkey_core::types::{NfcStatus, SystemMode};
use latchkey_core::{Error, Result};
use latchkey_hardware::{ButtonInput, DistanceSensor, LockServo, NfcDriver};
use latchkey_reader::{CardDetection, ReaderSession};

use crate::actuator::LockActuator;
use crate::debounce::DoorDebouncer;
use crate::mode::{ModeEvent, ModeMachine};
use crate::policy::AccessPolicy;
use crate::snapshot::{DisplaySnapshot, LastCard};

/// Tunables the binary reads from its config file.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Attempts before the reader bring-up gives up and the session is
    /// marked DISABLED for the rest of the run.
    pub nfc_init_retries: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            nfc_init_retries: DEFAULT_NFC_INIT_RETRIES,
        }
    }
}

/// Owns every peripheral and runs the 10ms tick loop.
///
/// Each tick drains pending remote commands, polls the reader and the
/// door sensor on their own cadences, advances the mode machine, and
/// publishes a display snapshot. Servo motions run inline, so a tick
/// that actuates the lock stretches past its slot; the interval timer
/// resynchronizes afterwards instead of bursting.
///
/// `run` returns only on an unrecoverable condition. The process is
/// expected to exit and let its supervisor restart it.
pub struct Controller<D, N, S, B, L>
where
    D: DistanceSensor,
    N: NfcDriver,
    S: LockServo,
    B: ButtonInput,
    L: LogSink,
{
    sensor: D,
    session: ReaderSession<N>,
    actuator: LockActuator<S>,
    button: B,
    log: L,
    policy: AccessPolicy,
    debouncer: DoorDebouncer,
    mode: ModeMachine,
    commands: mpsc::Receiver<String>,
    link_failures: Arc<AtomicU32>,
    snapshot_tx: watch::Sender<DisplaySnapshot>,
    config: ControllerConfig,
}

impl<D, N, S, B, L> Controller<D, N, S, B, L>
where
    D: DistanceSensor,
    N: NfcDriver,
    S: LockServo,
    B: ButtonInput,
    L: LogSink,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sensor: D,
        driver: N,
        servo: S,
        button: B,
        log: L,
        policy: AccessPolicy,
        commands: mpsc::Receiver<String>,
        link_failures: Arc<AtomicU32>,
        config: ControllerConfig,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(DisplaySnapshot::initial());
        Self {
            sensor,
            session: ReaderSession::new(driver),
            actuator: LockActuator::new(servo),
            button,
            log,
            policy,
            debouncer: DoorDebouncer::new(),
            mode: ModeMachine::new(),
            commands,
            link_failures,
            snapshot_tx,
            config,
        }
    }

    /// Subscribe to display snapshots. May be called before `run`.
    pub fn snapshots(&self) -> watch::Receiver<DisplaySnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run until an unrecoverable reader or link condition.
    pub async fn run(&mut self) -> Result<()> {
        if !self.session.begin(self.config.nfc_init_retries).await {
            warn!("card reader bring-up failed, continuing without NFC");
        }
        self.log.publish("System started");
        info!(firmware = ?self.session.firmware(), "control loop started");

        let start = Self::now();
        let mut last_nfc_check = start;
        let mut last_nfc_poll = start;
        let mut last_snapshot = start;

        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let now = Self::now();

            let link_failures = self.link_failures.load(Ordering::Relaxed);
            if link_failures >= CONSECUTIVE_ERROR_CEILING {
                return Err(Error::LinkUnrecoverable {
                    failures: link_failures,
                });
            }

            if self.session.status() != NfcStatus::Disabled
                && now.duration_since(last_nfc_check) >= NFC_CHECK_INTERVAL
            {
                last_nfc_check = now;
                self.session.ensure_connection().await;
                let reader_errors = self.session.consecutive_errors();
                if reader_errors >= CONSECUTIVE_ERROR_CEILING {
                    return Err(Error::ReaderUnrecoverable {
                        failures: reader_errors,
                    });
                }
            }

            while let Ok(raw) = self.commands.try_recv() {
                match Command::parse(&raw) {
                    Some(command) => self.handle_command(command, now).await,
                    None => debug!(%raw, "ignoring unknown command"),
                }
            }

            if now.duration_since(last_nfc_poll) >= NFC_POLL_INTERVAL {
                last_nfc_poll = now;
                if let Some(detection) = self.session.check_card(now).await {
                    self.handle_detection(detection, now).await;
                }
            }

            match self.button.was_pressed().await {
                Ok(true) => self.handle_button(now).await,
                Ok(false) => {}
                Err(error) => warn!(%error, "button read failed"),
            }

            match self.sensor.sample().await {
                Ok(sample) => {
                    self.debouncer.update(sample, now);
                }
                Err(error) => warn!(%error, "distance sample failed"),
            }

            if let Some(event) = self.mode.tick(self.debouncer.take_edge(), now) {
                self.handle_mode_event(event).await;
            }

            if now.duration_since(last_snapshot) >= DISPLAY_REFRESH_INTERVAL {
                last_snapshot = now;
                self.publish_snapshot(now);
            }
        }
    }

    /// Timestamps come from the tokio clock so paused-clock tests can
    /// drive the loop deterministically.
    fn now() -> Instant {
        tokio::time::Instant::now().into_std()
    }

    async fn handle_command(&mut self, command: Command, now: Instant) {
        match command {
            Command::Open => {
                self.unlock(now).await;
                self.log.publish("Command: openlock, switched to WAITING");
            }
            // An explicit override: locks regardless of mode and leaves
            // any waiting window running.
            Command::Close => {
                if let Err(error) = self.actuator.close(&self.log).await {
                    warn!(%error, "lock motion failed");
                }
                self.log.publish("Command: closelock");
            }
        }
    }

    async fn handle_detection(&mut self, detection: CardDetection, now: Instant) {
        let CardDetection { kind, id } = detection;
        if self.policy.is_allowed(&id) {
            self.log
                .publish(&format!("Card accepted: {kind} ID={id}"));
            self.unlock(now).await;
        } else {
            warn!(%kind, %id, "card rejected");
            self.log
                .publish(&format!("Card rejected: {kind} ID={id}"));
        }
    }

    async fn handle_button(&mut self, now: Instant) {
        match self.mode.mode() {
            SystemMode::Normal => {
                self.unlock(now).await;
                self.log.publish("Button pressed: switched to WAITING");
            }
            SystemMode::Waiting => {
                self.mode.exit_waiting();
                self.log.publish("Button pressed: switched to NORMAL");
            }
        }
    }

    async fn handle_mode_event(&mut self, event: ModeEvent) {
        match event {
            ModeEvent::TimedOut => {
                self.log.publish("WAITING timeout: switched to NORMAL");
            }
            ModeEvent::SawOpen => {
                self.log.publish("Detected CLOSE->OPEN in WAITING");
            }
            ModeEvent::AutoRelock => {
                if let Err(error) = self.actuator.close(&self.log).await {
                    warn!(%error, "lock motion failed");
                }
                self.log.publish("Auto-closed door after CLOSE->OPEN->CLOSE");
            }
        }
    }

    /// Unlock and open a fresh waiting window.
    ///
    /// The window is stamped with the tick timestamp, not the time the
    /// servo finished moving.
    async fn unlock(&mut self, now: Instant) {
        if let Err(error) = self.actuator.open(&self.log).await {
            warn!(%error, "lock motion failed");
        }
        self.mode.enter_waiting(now);
    }

    /// Refresh the watch value, notifying subscribers only when
    /// something visible changed.
    fn publish_snapshot(&self, now: Instant) {
        let snapshot = DisplaySnapshot {
            mode: self.mode.mode(),
            remaining_seconds: self.mode.remaining(now).map(|left| left.as_secs()),
            door: self.debouncer.state(),
            reader: self.session.status(),
            last_card: self
                .session
                .last_card()
                .map(|(kind, id)| LastCard { kind, id }),
            captured_at: chrono::Utc::now(),
        };
        self.snapshot_tx.send_if_modified(|current| {
            let changed = current.mode != snapshot.mode
                || current.remaining_seconds != snapshot.remaining_seconds
                || current.door != snapshot.door
                || current.reader != snapshot.reader
                || current.last_card != snapshot.last_card;
            if changed {
                *current = snapshot;
            }
            changed
        });
    }
}
