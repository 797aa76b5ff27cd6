//! Error types for the engine driver and game driver.
//!
//! Per the error handling design, I/O and protocol failures on an engine
//! stream are fatal to that engine handle; they are never recovered from
//! silently. Game-level outcomes (timeout, illegal move) are *not* modeled
//! as errors here -- they are first-class [`crate::result::ResultTag`]
//! values produced by [`crate::game::GameDriver::play`].

use std::io;

/// The crate's fallible surface.
pub type Res<T> = Result<T, DriverError>;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("failed to spawn '{cmd}': {source}")]
    Spawn { cmd: String, #[source] source: io::Error },

    #[error("I/O error talking to engine '{name}': {source}")]
    Io { name: String, #[source] source: io::Error },

    #[error("engine '{name}' closed its output stream")]
    StreamClosed { name: String },

    #[error("malformed 'info ... score ...' line from engine '{name}': {line}")]
    ScoreParse { name: String, line: String },

    #[error("failed to write engine log for '{name}': {source}")]
    LogWrite { name: String, #[source] source: io::Error },

    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("failed to signal or reap engine '{name}': {source}")]
    Reap { name: String, #[source] source: io::Error },
}
