//! Progress notifications emitted while a run advances.
//!
//! The monitor's return value is the structured [`crate::MonitorReport`];
//! observers only receive narration. The CLI renders these events as console
//! lines, tests record them, and the default [`NoopObserver`] discards them.

use std::time::Duration;

use pipeline::{BuildStatus, JobError, TriggerAck, TriggerOutcome};

/// One step of a trigger-and-monitor run.
#[derive(Debug, Clone, Copy)]
pub enum MonitorEvent<'a> {
    /// The trigger call is about to be sent.
    Triggering,
    /// The server accepted the trigger call.
    Triggered(&'a TriggerAck),
    /// The trigger call failed; the run ends without polling.
    TriggerFailed(&'a JobError),
    /// Waiting for the server to register the new build.
    Settling(Duration),
    /// Poll `attempt` (1-based) of `max_attempts` is about to be sent.
    Polling { attempt: u32, max_attempts: u32 },
    /// The poll produced no usable status.
    PollInconclusive { attempt: u32, error: &'a JobError },
    /// The build is still running.
    StillBuilding { attempt: u32, status: &'a BuildStatus },
    /// The build has stopped; the run is about to end.
    BuildFinished { attempt: u32, status: &'a BuildStatus },
    /// Waiting before the next poll.
    Waiting(Duration),
    /// The run reached its outcome. Always the last event.
    Finished(&'a TriggerOutcome),
}

/// Receives [`MonitorEvent`]s in the order they happen.
pub trait MonitorObserver: Send + Sync {
    /// Called synchronously from the monitor; must not block for long.
    fn notify(&self, event: MonitorEvent<'_>);
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MonitorObserver for NoopObserver {
    fn notify(&self, _event: MonitorEvent<'_>) {}
}
