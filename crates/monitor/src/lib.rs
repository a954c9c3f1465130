//! buildhook trigger-and-monitor orchestration.
//!
//! [`TriggerMonitor`] sends one trigger call through a [`pipeline::JobClient`],
//! waits for the server to register the build, then polls the job's status on
//! a fixed cadence until the build stops or the attempt budget runs out. Every
//! path ends in exactly one [`pipeline::TriggerOutcome`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The monitor sequences calls to the job client and
//! applies the timing policy in [`MonitorSettings`]. The classification of
//! statuses into outcomes lives in the [`pipeline`] crate; HTTP details live
//! in the `jenkins` crate.
//!
//! ## Narration
//!
//! Human-readable progress is not part of the result. It is delivered as
//! [`MonitorEvent`]s to a [`MonitorObserver`] so the state machine can be
//! tested without capturing console output.

pub mod executor;
pub mod observer;
pub mod settings;

pub use executor::{MonitorReport, Phase, TriggerMonitor};
pub use observer::{MonitorEvent, MonitorObserver, NoopObserver};
pub use settings::MonitorSettings;
