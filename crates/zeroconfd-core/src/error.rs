//! Error types for the zeroconfd client.

use thiserror::Error;

/// Primary error type for all resolver operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The client session is not connected to the daemon.
    #[error("client session is disconnected")]
    BadState,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("required argument is empty: {0}")]
    EmptyArgument(&'static str),
}

/// Malformed replies or events from the daemon.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("reply carries no operation handle")]
    MissingHandle,

    #[error("handle {0} is already registered")]
    DuplicateHandle(String),

    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {index} has the wrong type (expected {expected})")]
    ArgumentType {
        index: usize,
        expected: &'static str,
    },

    #[error("unknown protocol family {0}")]
    UnknownProtocol(i32),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
