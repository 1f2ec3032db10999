//! Error types for the runtime client.
//!
//! Expected protocol failures (no response, non-2xx status, missing request id)
//! are carried as [`ResponseCode`](crate::models::ResponseCode) values. The
//! variants here cover what ends the loop or prevents it from starting.

use std::fmt;

use crate::models::ResponseCode;

/// Custom error type for the runtime client.
#[derive(Debug)]
pub enum RuntimeError {
    /// The HTTP exchange could not be completed (DNS, connect, I/O).
    Transport(String),
    /// A required environment variable is missing or unusable.
    Config(String),
    /// Polling for the next invocation failed too many times in a row.
    RetriesExhausted(usize),
    /// A handler outcome could not be delivered to the control endpoint.
    ReportFailed {
        request_id: String,
        code: ResponseCode,
    },
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Transport error: {msg}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::RetriesExhausted(retries) => {
                write!(f, "Exhausted all {retries} retries polling for the next invocation")
            }
            Self::ReportFailed { request_id, code } => {
                write!(f, "Failed to report outcome of invocation {request_id}: {code}")
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<anyhow::Error> for RuntimeError {
    fn from(error: anyhow::Error) -> Self {
        Self::Transport(format!("{error:#}"))
    }
}

impl From<reqwest::Error> for RuntimeError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}
