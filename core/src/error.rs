use thiserror::Error;

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot load savegame version {actual}, expected {expected}")]
    VersionMismatch { expected: i64, actual: i64 },

    #[error("A save or load is already in progress")]
    Busy,

    #[error("Save slot {slot} out of range 1..={max}")]
    SlotOutOfRange { slot: u32, max: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SaveResult<T> = Result<T, SaveError>;
