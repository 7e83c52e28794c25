//! Error types for hardware operations.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }
}
