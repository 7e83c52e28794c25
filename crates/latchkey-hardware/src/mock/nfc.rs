//! Mock NFC reader chip for testing and development.
//!
//! Simulates a PN532-class chip: the handle controls whether the chip is
//! reachable on the bus and which card (if any) sits in the field. Polls
//! respond immediately; the poll timeout only matters on real hardware.

use crate::{
    Result,
    traits::NfcDriver,
    types::FirmwareVersion,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default firmware word reported by the mock (PN532 FW 1.6).
const MOCK_FIRMWARE_RAW: u32 = 0x3201_0600;

#[derive(Debug, Clone)]
enum FieldCard {
    Felica([u8; 8]),
    TypeA(Vec<u8>),
}

#[derive(Debug, Default)]
struct MockNfcState {
    /// Chip answers on the bus when true.
    online: bool,
    /// Upcoming firmware reads that go unanswered, consumed one per read.
    probe_failures: u32,
    card: Option<FieldCard>,
    wake_count: u32,
    configure_count: u32,
}

/// Mock NFC reader chip.
///
/// # Examples
///
/// ```
/// use latchkey_hardware::mock::MockNfcDriver;
/// use latchkey_hardware::traits::NfcDriver;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> latchkey_hardware::Result<()> {
///     let (mut driver, handle) = MockNfcDriver::new();
///     handle.set_online(true);
///     handle.present_type_a(vec![0x04, 0xAB, 0xCD, 0xEF]);
///
///     let uid = driver.poll_type_a(Duration::from_millis(10)).await?;
///     assert_eq!(uid, Some(vec![0x04, 0xAB, 0xCD, 0xEF]));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockNfcDriver {
    state: Arc<Mutex<MockNfcState>>,
}

impl MockNfcDriver {
    /// Create a mock chip, initially online with no card in the field.
    pub fn new() -> (Self, MockNfcHandle) {
        let state = Arc::new(Mutex::new(MockNfcState {
            online: true,
            ..MockNfcState::default()
        }));

        let driver = Self {
            state: Arc::clone(&state),
        };
        let handle = MockNfcHandle { state };

        (driver, handle)
    }
}

impl NfcDriver for MockNfcDriver {
    async fn wake(&mut self) -> Result<()> {
        self.state.lock().expect("mock nfc poisoned").wake_count += 1;
        Ok(())
    }

    async fn firmware_version(&mut self) -> Result<Option<FirmwareVersion>> {
        let mut state = self.state.lock().expect("mock nfc poisoned");
        if state.probe_failures > 0 {
            state.probe_failures -= 1;
            return Ok(None);
        }
        Ok(state.online.then(|| {
            FirmwareVersion::from_raw(MOCK_FIRMWARE_RAW).expect("mock firmware word is non-zero")
        }))
    }

    async fn configure(&mut self) -> Result<()> {
        self.state.lock().expect("mock nfc poisoned").configure_count += 1;
        Ok(())
    }

    async fn poll_felica(&mut self, _timeout: Duration) -> Result<Option<[u8; 8]>> {
        let state = self.state.lock().expect("mock nfc poisoned");
        if !state.online {
            return Ok(None);
        }
        match &state.card {
            Some(FieldCard::Felica(idm)) => Ok(Some(*idm)),
            _ => Ok(None),
        }
    }

    async fn poll_type_a(&mut self, _timeout: Duration) -> Result<Option<Vec<u8>>> {
        let state = self.state.lock().expect("mock nfc poisoned");
        if !state.online {
            return Ok(None);
        }
        match &state.card {
            Some(FieldCard::TypeA(uid)) => Ok(Some(uid.clone())),
            _ => Ok(None),
        }
    }
}

/// Handle for controlling a mock NFC chip.
#[derive(Debug, Clone)]
pub struct MockNfcHandle {
    state: Arc<Mutex<MockNfcState>>,
}

impl MockNfcHandle {
    /// Make the chip answer (or stop answering) on the bus.
    pub fn set_online(&self, online: bool) {
        self.state.lock().expect("mock nfc poisoned").online = online;
    }

    /// Place a FeliCa card in the field. It stays until removed.
    pub fn present_felica(&self, idm: [u8; 8]) {
        self.state.lock().expect("mock nfc poisoned").card = Some(FieldCard::Felica(idm));
    }

    /// Place a Type A card in the field. It stays until removed.
    pub fn present_type_a(&self, uid: Vec<u8>) {
        self.state.lock().expect("mock nfc poisoned").card = Some(FieldCard::TypeA(uid));
    }

    /// Leave the next `count` firmware reads unanswered, then answer
    /// normally again. Lets a test script a flapping chip whose liveness
    /// probes fail while re-initialization still succeeds.
    pub fn fail_probes(&self, count: u32) {
        self.state.lock().expect("mock nfc poisoned").probe_failures += count;
    }

    /// Remove whatever card is in the field.
    pub fn remove_card(&self) {
        self.state.lock().expect("mock nfc poisoned").card = None;
    }

    /// Number of `wake` calls seen so far.
    pub fn wake_count(&self) -> u32 {
        self.state.lock().expect("mock nfc poisoned").wake_count
    }

    /// Number of `configure` calls seen so far.
    pub fn configure_count(&self) -> u32 {
        self.state.lock().expect("mock nfc poisoned").configure_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const POLL: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn test_offline_chip_does_not_answer() {
        let (mut driver, handle) = MockNfcDriver::new();
        handle.set_online(false);

        assert!(driver.firmware_version().await.unwrap().is_none());
        assert!(driver.poll_felica(POLL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_presented_card_is_polled_by_family() {
        let (mut driver, handle) = MockNfcDriver::new();

        handle.present_felica([1, 2, 3, 4, 5, 6, 7, 8]);
        assert!(driver.poll_felica(POLL).await.unwrap().is_some());
        assert!(driver.poll_type_a(POLL).await.unwrap().is_none());

        handle.present_type_a(vec![0x04, 0xAB, 0xCD, 0xEF]);
        assert!(driver.poll_felica(POLL).await.unwrap().is_none());
        assert!(driver.poll_type_a(POLL).await.unwrap().is_some());

        handle.remove_card();
        assert!(driver.poll_type_a(POLL).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scheduled_probe_failures_are_consumed() {
        let (mut driver, handle) = MockNfcDriver::new();
        handle.fail_probes(2);

        assert!(driver.firmware_version().await.unwrap().is_none());
        assert!(driver.firmware_version().await.unwrap().is_none());
        // Schedule exhausted: the online chip answers again.
        assert!(driver.firmware_version().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lifecycle_counters() {
        let (mut driver, handle) = MockNfcDriver::new();
        driver.wake().await.unwrap();
        driver.wake().await.unwrap();
        driver.configure().await.unwrap();

        assert_eq!(handle.wake_count(), 2);
        assert_eq!(handle.configure_count(), 1);
    }
}
