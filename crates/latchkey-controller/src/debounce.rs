//! Door state debouncing.
//!
//! Raw distance samples are noisy: a passing hand or a sensor glitch
//! must not look like a door movement. Opening is reported immediately,
//! closing only after an unbroken run of close-range samples.

use std::time::Instant;

use latchkey_core::constants::{CLOSE_DISTANCE_MM, DOOR_CLOSE_DEBOUNCE};
use latchkey_core::types::DoorState;
use latchkey_hardware::DistanceSample;

/// A committed door state transition, observed between two ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorEdge {
    /// CLOSE -> OPEN.
    Opened,
    /// OPEN -> CLOSE.
    Closed,
}

/// Debounces raw distance samples into a stable [`DoorState`].
///
/// An invalid sample (sensor fault, out of range) counts as "not close",
/// so a flaky sensor reads as an open door rather than freezing the
/// last state.
#[derive(Debug)]
pub struct DoorDebouncer {
    state: DoorState,
    edge: Option<DoorEdge>,
    close_since: Option<Instant>,
}

impl DoorDebouncer {
    pub fn new() -> Self {
        Self {
            state: DoorState::Open,
            edge: None,
            close_since: None,
        }
    }

    /// The current stable door state.
    pub fn state(&self) -> DoorState {
        self.state
    }

    /// Feed one sample taken at `now` and return the stable state.
    ///
    /// A close-range sample starts (or continues) the debounce window;
    /// the CLOSE state commits once the window has lasted
    /// [`DOOR_CLOSE_DEBOUNCE`]. Any far or invalid sample resets the
    /// window and commits OPEN immediately.
    pub fn update(&mut self, sample: DistanceSample, now: Instant) -> DoorState {
        let in_close_range = sample.valid && sample.millimeters < CLOSE_DISTANCE_MM;
        let previous = self.state;

        if in_close_range {
            match self.close_since {
                None => {
                    self.close_since = Some(now);
                }
                Some(since) => {
                    if now.duration_since(since) >= DOOR_CLOSE_DEBOUNCE {
                        self.state = DoorState::Close;
                    }
                }
            }
        } else {
            self.close_since = None;
            self.state = DoorState::Open;
        }

        self.edge = match (previous, self.state) {
            (DoorState::Close, DoorState::Open) => Some(DoorEdge::Opened),
            (DoorState::Open, DoorState::Close) => Some(DoorEdge::Closed),
            _ => None,
        };

        self.state
    }

    /// Takes the transition committed by the most recent [`update`] call.
    ///
    /// Consuming, so a tick that skips `update` (a failed sensor read)
    /// cannot act on the previous tick's edge a second time.
    ///
    /// [`update`]: DoorDebouncer::update
    pub fn take_edge(&mut self) -> Option<DoorEdge> {
        self.edge.take()
    }
}

impl Default for DoorDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn close() -> DistanceSample {
        DistanceSample::valid(30)
    }

    fn far() -> DistanceSample {
        DistanceSample::valid(120)
    }

    #[test]
    fn starts_open() {
        let mut debouncer = DoorDebouncer::new();
        assert_eq!(debouncer.state(), DoorState::Open);
        assert_eq!(debouncer.take_edge(), None);
    }

    #[test]
    fn close_commits_only_after_debounce_window() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        assert_eq!(debouncer.update(close(), t0), DoorState::Open);
        assert_eq!(
            debouncer.update(close(), t0 + Duration::from_millis(1999)),
            DoorState::Open
        );
        assert_eq!(
            debouncer.update(close(), t0 + Duration::from_millis(2000)),
            DoorState::Close
        );
        assert_eq!(debouncer.take_edge(), Some(DoorEdge::Closed));
    }

    #[test]
    fn edge_clears_on_next_tick() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(close(), t0 + Duration::from_millis(2000));
        assert_eq!(debouncer.take_edge(), Some(DoorEdge::Closed));

        debouncer.update(close(), t0 + Duration::from_millis(2010));
        assert_eq!(debouncer.take_edge(), None);
    }

    #[test]
    fn opened_edge_does_not_linger_into_new_window() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(close(), t0 + Duration::from_millis(2000));
        debouncer.update(far(), t0 + Duration::from_millis(2100));
        assert_eq!(debouncer.take_edge(), Some(DoorEdge::Opened));

        // The next close sample only starts a window; no transition.
        debouncer.update(close(), t0 + Duration::from_millis(2200));
        assert_eq!(debouncer.take_edge(), None);
    }

    #[test]
    fn taken_edge_is_not_served_twice() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(close(), t0 + Duration::from_millis(2000));
        assert_eq!(debouncer.take_edge(), Some(DoorEdge::Closed));

        // A tick with no sample (failed sensor read) consults the edge
        // again without an intervening update; it must stay consumed.
        assert_eq!(debouncer.take_edge(), None);
        assert_eq!(debouncer.state(), DoorState::Close);
    }

    #[test]
    fn far_sample_resets_debounce_window() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(far(), t0 + Duration::from_millis(1500));
        // Window restarts; 2s total elapsed but only 400ms continuous.
        assert_eq!(
            debouncer.update(close(), t0 + Duration::from_millis(1600)),
            DoorState::Open
        );
        assert_eq!(
            debouncer.update(close(), t0 + Duration::from_millis(3600)),
            DoorState::Close
        );
    }

    #[test]
    fn invalid_sample_counts_as_not_close() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(DistanceSample::invalid(), t0 + Duration::from_millis(1000));
        assert_eq!(
            debouncer.update(close(), t0 + Duration::from_millis(1100)),
            DoorState::Open
        );
    }

    #[test]
    fn open_commits_immediately_with_edge() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(close(), t0);
        debouncer.update(close(), t0 + Duration::from_millis(2000));
        assert_eq!(debouncer.state(), DoorState::Close);

        assert_eq!(
            debouncer.update(far(), t0 + Duration::from_millis(2100)),
            DoorState::Open
        );
        assert_eq!(debouncer.take_edge(), Some(DoorEdge::Opened));
    }

    #[test]
    fn boundary_distance_is_not_close() {
        let mut debouncer = DoorDebouncer::new();
        let t0 = Instant::now();

        debouncer.update(DistanceSample::valid(CLOSE_DISTANCE_MM), t0);
        assert_eq!(
            debouncer.update(
                DistanceSample::valid(CLOSE_DISTANCE_MM),
                t0 + Duration::from_millis(2500)
            ),
            DoorState::Open
        );
    }
}
