//! Error types for the pipeline.
//!
//! Only [`Fault`] is fatal. Everything the keyboard expects to happen in
//! normal use (a full key set, a release of an untracked key, a report sent
//! while the host is away) is absorbed where it happens and never reaches
//! these types.

use thiserror::Error;

/// Resource exhaustion. The pipeline state can no longer be trusted and the
/// outer system must halt.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The task queue had no room for another task.
    #[error("task queue full")]
    QueueFull,

    /// One scan produced more transitions than a sync message can carry.
    #[error("sync message buffer full")]
    SyncBufferFull,
}

/// Rejected configuration, reported by [`crate::Keyboard::new`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("matrix has {rows} rows, at most {max} supported")]
    TooManyRows { rows: usize, max: usize },

    #[error("matrix has {cols} columns, at most {max} supported")]
    TooManyCols { cols: usize, max: usize },

    #[error("matrix row {row} has {cols} columns, expected {expected}")]
    RaggedMatrix {
        row: usize,
        cols: usize,
        expected: usize,
    },

    #[error("position {position} at ({row}, {col}) does not fit a signed byte")]
    PositionOutOfRange { row: usize, col: usize, position: u8 },

    #[error("max_keys must be between 1 and {max}, got {value}")]
    MaxKeys { value: usize, max: usize },

    #[error("report_keys must be between 1 and {max}, got {value}")]
    ReportKeys { value: usize, max: usize },

    #[error("scan interval must be non-zero")]
    ZeroScanInterval,

    #[error("keymap: {0}")]
    Keymap(splitkb_keymap::KeymapError),
}

/// A sync payload that could not be decoded. The payload is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty payload")]
    Empty,

    #[error("length prefix says {declared} deltas, payload carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("{0} deltas exceed the message capacity")]
    TooManyDeltas(usize),

    #[error("delta {index} is zero")]
    ZeroDelta { index: usize },

    #[error("delta {index} ({delta}) does not name a position")]
    InvalidDelta { index: usize, delta: i8 },
}

/// Returned by transport seams when nothing is listening.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("not connected")]
    NotConnected,
}
