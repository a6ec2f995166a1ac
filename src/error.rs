//! Unified error types for the mesh node application core.
//!
//! A single `Error` enum that every collaborator failure can convert into,
//! keeping the event loop's error handling uniform.  All variants are `Copy`
//! so they can be passed through handlers without allocation.
//!
//! None of these terminate the event loop: handlers log them and degrade to
//! a no-op or the single built-in retry.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible collaborator call funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The application-protocol collaborator could not send.
    Transport(TransportError),
    /// The mesh stack rejected a request.
    Network(NetworkError),
    /// A timer could not be started.
    Timer(TimerError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Network(e) => write!(f, "network: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No protocol session could be opened (pool exhausted).
    NoSession,
    /// The message was rejected by the lower layer.
    SendFailed,
    /// Endpoint registration failed at start-up.
    RegistrationFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no session available"),
            Self::SendFailed => write!(f, "send failed"),
            Self::RegistrationFailed => write!(f, "endpoint registration failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Network errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The stack refused the join request (busy or already attached).
    JoinRejected,
    /// The stack instance is not running.
    NotStarted,
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JoinRejected => write!(f, "join rejected"),
            Self::NotStarted => write!(f, "stack instance not started"),
        }
    }
}

impl From<NetworkError> for Error {
    fn from(e: NetworkError) -> Self {
        Self::Network(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The hardware timer pool has no free entry.
    NoTimerAvailable,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTimerAvailable => write!(f, "no timer available"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
