//! Terminal outcome of one trigger-and-monitor run.
//!
//! [`TriggerOutcome`] is deliberately a closed enum: callers must handle the
//! "we don't know" case ([`TriggerOutcome::Unresolved`]) separately from a
//! build that is known to have failed.

use serde::{Deserialize, Serialize};

use crate::{BuildNumber, BuildResult, BuildStatus, JobError};

/// Why a triggered run ended without a success or failure verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum UnresolvedCause {
    /// Every poll attempt was spent while the build was still running or its
    /// status could not be read.
    BudgetExhausted {
        /// Last status that was parsed successfully, if any poll produced one.
        last_status: Option<BuildStatus>,
    },
    /// The build finished, but with a result that is neither success nor
    /// failure (e.g. `ABORTED`).
    UnrecognisedResult {
        build: Option<BuildNumber>,
        result: BuildResult,
    },
}

/// Exactly one of the four ways a run can end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TriggerOutcome {
    /// The trigger was accepted and the build finished with `SUCCESS`.
    Succeeded { build: Option<BuildNumber> },
    /// The trigger was accepted and the build finished with `FAILURE`.
    Failed { build: Option<BuildNumber> },
    /// The trigger was accepted but no success/failure verdict was observed.
    Unresolved { cause: UnresolvedCause },
    /// The trigger call itself failed; no status was ever requested.
    TriggerFailed { error: JobError },
}

impl TriggerOutcome {
    /// Maps a terminal (`building == false`) status to its outcome.
    pub fn from_terminal_status(status: &BuildStatus) -> Self {
        match &status.result {
            BuildResult::Success => Self::Succeeded {
                build: status.number,
            },
            BuildResult::Failure => Self::Failed {
                build: status.number,
            },
            other => Self::Unresolved {
                cause: UnresolvedCause::UnrecognisedResult {
                    build: status.number,
                    result: other.clone(),
                },
            },
        }
    }

    /// Build number the outcome refers to, when one is known.
    pub fn build_number(&self) -> Option<BuildNumber> {
        match self {
            Self::Succeeded { build } | Self::Failed { build } => *build,
            Self::Unresolved {
                cause: UnresolvedCause::UnrecognisedResult { build, .. },
            } => *build,
            Self::Unresolved {
                cause: UnresolvedCause::BudgetExhausted { last_status },
            } => last_status.as_ref().and_then(|s| s.number),
            Self::TriggerFailed { .. } => None,
        }
    }

    /// `true` when the build was triggered, i.e. for every variant except
    /// [`TriggerOutcome::TriggerFailed`].
    pub fn was_triggered(&self) -> bool {
        !matches!(self, Self::TriggerFailed { .. })
    }

    /// Short machine-friendly label for structured logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
            Self::Unresolved { .. } => "unresolved",
            Self::TriggerFailed { .. } => "trigger_failed",
        }
    }
}

impl std::fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let build = |n: &Option<BuildNumber>| match n {
            Some(n) => format!("build #{n}"),
            None => "build".to_owned(),
        };
        match self {
            Self::Succeeded { build: n } => write!(f, "{} succeeded", build(n)),
            Self::Failed { build: n } => write!(f, "{} failed", build(n)),
            Self::Unresolved {
                cause: UnresolvedCause::UnrecognisedResult { build: n, result },
            } => write!(f, "{} finished with status {result}", build(n)),
            Self::Unresolved {
                cause: UnresolvedCause::BudgetExhausted { .. },
            } => write!(f, "build did not finish within the poll budget"),
            Self::TriggerFailed { error } => write!(f, "trigger failed: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_status_maps_to_verdicts() {
        let ok = BuildStatus::from_parts(Some(3), Some("SUCCESS"), false);
        assert_eq!(
            TriggerOutcome::from_terminal_status(&ok),
            TriggerOutcome::Succeeded {
                build: Some(BuildNumber::new(3))
            }
        );

        let bad = BuildStatus::from_parts(Some(42), Some("FAILURE"), false);
        let outcome = TriggerOutcome::from_terminal_status(&bad);
        assert_eq!(outcome.label(), "failed");
        assert_eq!(outcome.build_number(), Some(BuildNumber::new(42)));
        assert_eq!(outcome.to_string(), "build #42 failed");
    }

    #[test]
    fn unrecognised_result_is_unresolved_not_failed() {
        let aborted = BuildStatus::from_parts(Some(9), Some("ABORTED"), false);
        let outcome = TriggerOutcome::from_terminal_status(&aborted);
        assert!(matches!(
            outcome,
            TriggerOutcome::Unresolved {
                cause: UnresolvedCause::UnrecognisedResult { .. }
            }
        ));
        assert_eq!(outcome.to_string(), "build #9 finished with status ABORTED");
    }

    #[test]
    fn trigger_failure_was_not_triggered() {
        let outcome = TriggerOutcome::TriggerFailed {
            error: JobError::Rejected { status: 401 },
        };
        assert!(!outcome.was_triggered());
        assert_eq!(outcome.build_number(), None);
    }

    #[test]
    fn budget_exhaustion_reports_last_seen_build() {
        let outcome = TriggerOutcome::Unresolved {
            cause: UnresolvedCause::BudgetExhausted {
                last_status: Some(BuildStatus::from_parts(Some(11), None, true)),
            },
        };
        assert!(outcome.was_triggered());
        assert_eq!(outcome.build_number(), Some(BuildNumber::new(11)));
    }

    #[test]
    fn serialises_as_tagged_object() {
        let json = serde_json::to_value(TriggerOutcome::Failed {
            build: Some(BuildNumber::new(42)),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "failed", "build": 42}));
    }
}
