use std::fmt;

use crate::models::InvocationRequest;

/// Why a protocol exchange did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    /// No response was received from the control endpoint, or the response
    /// could not be trusted (missing request id).
    RequestNotMade,
    /// The control endpoint answered with a status outside 200..=299.
    Status(u16),
}

impl ResponseCode {
    #[must_use]
    pub const fn status(self) -> Option<u16> {
        match self {
            Self::RequestNotMade => None,
            Self::Status(code) => Some(code),
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestNotMade => write!(f, "request not made"),
            Self::Status(code) => write!(f, "HTTP response code {code}"),
        }
    }
}

/// Outcome of polling for the next invocation.
pub type NextOutcome = Result<InvocationRequest, ResponseCode>;

/// Outcome of reporting a handler result.
pub type PostOutcome = Result<(), ResponseCode>;
