//! Port trait through which the orchestration layer drives a CI job.
//!
//! ## Architectural Layer
//!
//! **Port definition.** The `jenkins` crate implements [`JobClient`] over HTTP;
//! tests implement it with scripted in-memory responses. The endpoint and
//! credentials are bound when the client is constructed, so a client value
//! always refers to exactly one job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{BuildStatus, JobError, QueueItemId};

/// Acknowledgement returned by a successful trigger call.
///
/// Acceptance only means the server took the request; it does not guarantee
/// the build has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerAck {
    /// HTTP status of the trigger response (usually `201 Created`).
    pub http_status: u16,
    /// Queue item created for the build, when the server reported it.
    pub queue_item: Option<QueueItemId>,
}

/// A remote CI job that can be triggered and queried.
///
/// Implementations bound each call by their own request timeout and report
/// every failure as a [`JobError`]; they never retry internally.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Asks the server to start a new build of the job.
    async fn trigger_job(&self) -> Result<TriggerAck, JobError>;

    /// Fetches the status of the job's last build.
    async fn fetch_status(&self) -> Result<BuildStatus, JobError>;
}

#[async_trait]
impl<T: JobClient + ?Sized> JobClient for std::sync::Arc<T> {
    async fn trigger_job(&self) -> Result<TriggerAck, JobError> {
        (**self).trigger_job().await
    }

    async fn fetch_status(&self) -> Result<BuildStatus, JobError> {
        (**self).fetch_status().await
    }
}
