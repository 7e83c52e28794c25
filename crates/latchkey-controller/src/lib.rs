//! Control loop for the latch appliance.
//!
//! Glues the door sensor, NFC reader session, lock servo, and remote
//! command feed into a single cooperative tick loop. The pure pieces
//! (debouncer, access policy, mode machine) live in their own modules
//! and take explicit timestamps so tests can drive them directly.

pub mod actuator;
pub mod controller;
pub mod debounce;
pub mod mode;
pub mod policy;
pub mod snapshot;

pub use actuator::LockActuator;
pub use controller::{Controller, ControllerConfig};
pub use debounce::{DoorDebouncer, DoorEdge};
pub use mode::{ModeEvent, ModeMachine};
pub use policy::AccessPolicy;
pub use snapshot::{DisplaySnapshot, LastCard};
