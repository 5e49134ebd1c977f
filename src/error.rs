//! Error types for the IRC client engine.
//!
//! The taxonomy is deliberately small: transport failures surface as
//! [`ProtocolError::Io`], lines that cannot be parsed yield a
//! [`MessageParseError`], and everything else (unknown commands, missing
//! arguments) is a protocol anomaly the engine silently ignores.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during connecting, reading, or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse an inbound line.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw line.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when parsing a single IRC line.
///
/// A parse failure is never fatal: the engine skips the offending line,
/// logs it, and keeps reading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// The line was empty, whitespace-only, or contained no command token
    /// after its prefix.
    #[error("no command token")]
    MissingCommand,
}
