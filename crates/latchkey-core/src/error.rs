use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Identifier errors
    #[error("Invalid card ID: {0}")]
    InvalidCardId(String),

    // Fatal conditions: the process is expected to be restarted by its
    // supervisor, all controller state is volatile and safe to lose.
    #[error("Card reader unrecoverable after {failures} consecutive check failures")]
    ReaderUnrecoverable { failures: u32 },

    #[error("Remote link unrecoverable after {failures} consecutive reconnect failures")]
    LinkUnrecoverable { failures: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
