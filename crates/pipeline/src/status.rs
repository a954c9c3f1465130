//! Remote build status as observed through one status poll.

use serde::{Deserialize, Serialize};

use crate::BuildNumber;

/// Result code of a build.
///
/// `Pending` is used while the build is still running and has no result yet.
/// `Unknown` covers a finished build whose result is absent or not one the
/// monitor maps to success or failure; the raw code (e.g. `"ABORTED"`,
/// `"UNSTABLE"`) is kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    /// `SUCCESS`.
    Success,
    /// `FAILURE`.
    Failure,
    /// Still running, no result reported yet.
    Pending,
    /// Any other code, or none on a stopped build.
    Unknown(Option<String>),
}

impl BuildResult {
    /// Classifies a raw result code as reported by the CI server.
    ///
    /// A missing code means "no result yet" while `building` is true and
    /// "unknown" once the build has stopped.
    pub fn from_code(code: Option<&str>, building: bool) -> Self {
        match code {
            Some("SUCCESS") => Self::Success,
            Some("FAILURE") => Self::Failure,
            Some(other) => Self::Unknown(Some(other.to_owned())),
            None if building => Self::Pending,
            None => Self::Unknown(None),
        }
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Failure => write!(f, "FAILURE"),
            Self::Pending => write!(f, "PENDING"),
            Self::Unknown(Some(code)) => write!(f, "{code}"),
            Self::Unknown(None) => write!(f, "UNKNOWN"),
        }
    }
}

/// Snapshot of the job's last build.
///
/// Transient: re-fetched on every poll. Only [`BuildStatus::number`] carries
/// identity across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatus {
    /// Build number, when the server reported one.
    pub number: Option<BuildNumber>,
    /// Result code, classified.
    pub result: BuildResult,
    /// `true` while the build is still executing.
    pub building: bool,
}

impl BuildStatus {
    /// Builds a status from the raw fields of a status response.
    pub fn from_parts(number: Option<u64>, result: Option<&str>, building: bool) -> Self {
        Self {
            number: number.map(BuildNumber::new),
            result: BuildResult::from_code(result, building),
            building,
        }
    }

    /// `true` once the build has stopped executing, whatever its result.
    pub fn is_terminal(&self) -> bool {
        !self.building
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.number {
            Some(n) => write!(f, "build #{n}")?,
            None => write!(f, "build #?")?,
        }
        if self.building {
            write!(f, " running")
        } else {
            write!(f, " finished with {}", self.result)
        }
    }
}
