use std::path::PathBuf;

use thiserror::Error;

/// Every fatal condition the core pipeline can raise (`spec.md` §7).
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("failed to decode snapshot: {0}")]
    DecodeError(String),

    #[error("device id out of range, expected {expected}, got {got}")]
    DeviceOutOfRange { expected: String, got: usize },

    #[error(
        "requested device ({device}) has no trace in this snapshot. Devices with trace: {with_trace:?}"
    )]
    EmptyDevice {
        device: usize,
        with_trace: Vec<usize>,
    },

    #[error("destination already exists: {0}")]
    DestinationExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
