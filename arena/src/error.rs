//! Error taxonomy for the arena.
//!
//! | Kind            | Raised by                | Handling                                  |
//! |-----------------|--------------------------|-------------------------------------------|
//! | `SetupError`    | orchestrator validation  | fatal, returned before any round runs     |
//! | `ProviderError` | provider invocation      | recovered: failed answer / degraded round |
//! | `ParseError`    | judgment dialect parsers | recovered: next dialect, then fallback    |
//! | `SinkError`     | report sinks             | returned to the caller of the sink        |
//!
//! Only `SetupError` ever stops a run. Everything raised after the first
//! round starts is recorded on the affected `JudgmentRound` instead.

use std::time::Duration;

use thiserror::Error;

/// Validation failures detected before a tournament starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("not enough participants: need at least {need}, got {got}")]
    InsufficientParticipants { got: usize, need: usize },

    #[error("duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("participant name must not be empty")]
    EmptyParticipantName,

    #[error("participant name has surrounding whitespace: {0:?}")]
    UntrimmedParticipantName(String),

    #[error("no questions supplied")]
    NoQuestions,
}

/// Failure of a single provider call (transport, non-success status, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", self.describe())]
pub struct ProviderError {
    /// HTTP status code when the provider answered with a non-success status.
    pub status: Option<u16>,
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Error used when an invocation exceeds its time budget.
    pub fn timeout(after: Duration) -> Self {
        Self::new(format!("timed out after {}s", after.as_secs_f64()))
    }

    fn describe(&self) -> String {
        match self.status {
            Some(status) => format!("provider error ({}): {}", status, self.message),
            None => format!("provider error: {}", self.message),
        }
    }
}

/// Why a judgment dialect could not turn a response into rankings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no {0} payload found in response")]
    NotFound(&'static str),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("unknown contestant in ranking: {0}")]
    UnknownContestant(String),

    #[error("contestant ranked twice: {0}")]
    DuplicateContestant(String),

    #[error("no contestant could be ranked")]
    Empty,
}

/// Failure while publishing or loading a finished run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
