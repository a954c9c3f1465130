//! Core domain for buildhook.
//!
//! This crate contains the push-event model, the remote build status model, the
//! terminal outcome of a trigger-and-monitor run, and the [`JobClient`] port
//! through which the orchestration layer talks to a CI server. Infrastructure
//! crates implement the port; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`CommitSha`, `BuildNumber`, `TriggerRunId`, etc.) |
//! | [`types`] | Shared value types (`Timestamp`, `JobEndpoint`, `Credentials`) |
//! | [`event`] | `PushEvent` and the event builder |
//! | [`status`] | `BuildStatus` and `BuildResult` |
//! | [`outcome`] | `TriggerOutcome`, the closed set of terminal results |
//! | [`errors`] | `JobError`, the failure taxonomy of a single remote call |
//! | [`ports`] | The `JobClient` trait |

pub mod errors;
pub mod event;
pub mod identifiers;
pub mod outcome;
pub mod ports;
pub mod status;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::JobError;
pub use event::{build_push_event, Commit, Person, PushEvent, PushEventTemplate, Repository};
pub use identifiers::{BuildNumber, CommitSha, GitRef, QueueItemId, RepositoryName, TriggerRunId};
pub use outcome::{TriggerOutcome, UnresolvedCause};
pub use ports::{JobClient, TriggerAck};
pub use status::{BuildResult, BuildStatus};
pub use types::{Credentials, JobEndpoint, Timestamp};
