//! Failure taxonomy of a single call to the CI server.
//!
//! [`JobError`] describes why one trigger or status call did not produce a
//! usable answer. What the failure *means* depends on the stage: at the
//! trigger stage every variant ends the run, while during polling every
//! variant only makes that one attempt inconclusive. Exhausting the poll
//! budget is not an error at all; it is the
//! [`crate::UnresolvedCause::BudgetExhausted`] outcome.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by a [`crate::JobClient`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum JobError {
    /// The call did not complete within the per-request timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout, in milliseconds.
        timeout_ms: u64,
    },

    /// The request failed below HTTP: connection refused, DNS failure, TLS
    /// error, or a truncated response.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the underlying failure.
        message: String,
    },

    /// The server answered with a non-success HTTP status (e.g. 401 for bad
    /// credentials, 404 for an unknown job or a job with no builds yet).
    #[error("server rejected the request with HTTP {status}")]
    Rejected {
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// The response body was not a status document in the expected format.
    #[error("malformed status response: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },
}

impl JobError {
    /// Whether the failure leaves the job's state unknown rather than
    /// reporting something about the job itself.
    ///
    /// Every current variant is inconclusive; the monitor relies on this when
    /// deciding to spend another poll attempt.
    pub fn is_inconclusive(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::Transport { .. }
            | Self::Rejected { .. }
            | Self::Parse { .. } => true,
        }
    }

    /// Short machine-friendly label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Rejected { .. } => "rejected",
            Self::Parse { .. } => "parse",
        }
    }
}
