//! The trigger-and-monitor state machine.
//!
//! ```text
//! NotTriggered ──▶ Triggering ──ok──▶ Polling(1) ──▶ … ──▶ Polling(n) ──▶ Terminal
//!                      │                  │ building=false                 ▲
//!                      └──err─────────────┴───────────────────────────────┘
//! ```
//!
//! Each call to [`TriggerMonitor::step`] performs the entry action of one
//! state and returns the next one. [`Phase::Terminal`] is absorbing: stepping
//! it makes no network call.

use std::sync::Arc;

use pipeline::{
    BuildStatus, JobClient, PushEvent, Timestamp, TriggerOutcome, TriggerRunId, UnresolvedCause,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{MonitorEvent, MonitorObserver, MonitorSettings, NoopObserver};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// State of a run between two steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has been sent yet.
    NotTriggered,
    /// The trigger call is next.
    Triggering,
    /// About to send poll `attempt` (1-based).
    Polling {
        /// 1-based; exceeds `max_attempts` once the budget is spent.
        attempt: u32,
        /// Most recent status parsed successfully, carried into the
        /// budget-exhausted outcome.
        last_status: Option<BuildStatus>,
    },
    /// The run is over; stepping again is a no-op.
    Terminal(TriggerOutcome),
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Structured result of one [`TriggerMonitor::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorReport {
    /// Identifier recorded on the run's tracing span.
    pub run_id: TriggerRunId,
    /// Verdict of the run.
    pub outcome: TriggerOutcome,
    /// Number of status calls actually sent.
    pub poll_attempts: u32,
    /// Wall-clock time at which the run started.
    pub started_at: Timestamp,
    /// Wall-clock time at which the outcome was reached.
    pub finished_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Triggers one build of a job and polls it to a [`TriggerOutcome`].
///
/// Strictly sequential: at most one call to the [`JobClient`] is in flight.
pub struct TriggerMonitor<C> {
    client: C,
    settings: MonitorSettings,
    observer: Arc<dyn MonitorObserver>,
}

impl<C: JobClient> TriggerMonitor<C> {
    /// Creates a monitor over `client` with no progress observer.
    pub fn new(client: C, settings: MonitorSettings) -> Self {
        Self {
            client,
            settings,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replaces the progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn MonitorObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Runs the state machine from [`Phase::NotTriggered`] to a terminal
    /// outcome.
    ///
    /// `event` is only used for log context; it is not sent to the server.
    #[instrument(
        name = "trigger_and_monitor",
        skip_all,
        fields(
            run_id = tracing::field::Empty,
            repository = %event.repository().full_name,
            branch = %event.branch_name(),
            commit = %event.after(),
        )
    )]
    pub async fn run(&self, event: &PushEvent) -> MonitorReport {
        let run_id = TriggerRunId::new_random();
        tracing::Span::current().record("run_id", tracing::field::display(run_id));
        let started_at = Timestamp::now();

        let mut phase = Phase::NotTriggered;
        let mut poll_attempts = 0;
        let outcome = loop {
            if let Phase::Polling { attempt, .. } = &phase {
                if *attempt <= self.settings.max_attempts {
                    poll_attempts += 1;
                }
            }
            phase = match self.step(phase).await {
                Phase::Terminal(outcome) => break outcome,
                next => next,
            };
        };

        info!(
            outcome = outcome.label(),
            build = ?outcome.build_number().map(|n| n.as_u64()),
            poll_attempts,
            "run finished"
        );
        self.observer.notify(MonitorEvent::Finished(&outcome));

        MonitorReport {
            run_id,
            outcome,
            poll_attempts,
            started_at,
            finished_at: Timestamp::now(),
        }
    }

    /// Performs the entry action of `phase` and returns the next phase.
    pub async fn step(&self, phase: Phase) -> Phase {
        match phase {
            Phase::NotTriggered => Phase::Triggering,
            Phase::Triggering => self.trigger().await,
            Phase::Polling {
                attempt,
                last_status,
            } => self.poll(attempt, last_status).await,
            terminal @ Phase::Terminal(_) => terminal,
        }
    }

    async fn trigger(&self) -> Phase {
        self.observer.notify(MonitorEvent::Triggering);

        match self.client.trigger_job().await {
            Ok(ack) => {
                info!(
                    http_status = ack.http_status,
                    queue_item = ?ack.queue_item.map(|q| q.as_u64()),
                    "trigger accepted"
                );
                self.observer.notify(MonitorEvent::Triggered(&ack));

                self.observer
                    .notify(MonitorEvent::Settling(self.settings.settle_delay));
                tokio::time::sleep(self.settings.settle_delay).await;

                Phase::Polling {
                    attempt: 1,
                    last_status: None,
                }
            }
            Err(error) => {
                warn!(error = %error, kind = error.kind(), "trigger failed");
                self.observer.notify(MonitorEvent::TriggerFailed(&error));
                Phase::Terminal(TriggerOutcome::TriggerFailed { error })
            }
        }
    }

    async fn poll(&self, attempt: u32, mut last_status: Option<BuildStatus>) -> Phase {
        let max_attempts = self.settings.max_attempts;
        if attempt > max_attempts {
            warn!(max_attempts, "poll budget exhausted");
            return Phase::Terminal(TriggerOutcome::Unresolved {
                cause: UnresolvedCause::BudgetExhausted { last_status },
            });
        }

        self.observer.notify(MonitorEvent::Polling {
            attempt,
            max_attempts,
        });

        match self.client.fetch_status().await {
            Ok(status) if status.is_terminal() => {
                info!(attempt, status = %status, "build finished");
                self.observer
                    .notify(MonitorEvent::BuildFinished { attempt, status: &status });
                return Phase::Terminal(TriggerOutcome::from_terminal_status(&status));
            }
            Ok(status) => {
                debug!(attempt, status = %status, "build still running");
                self.observer
                    .notify(MonitorEvent::StillBuilding { attempt, status: &status });
                last_status = Some(status);
            }
            Err(error) => {
                debug_assert!(error.is_inconclusive());
                warn!(attempt, error = %error, kind = error.kind(), "poll inconclusive");
                self.observer
                    .notify(MonitorEvent::PollInconclusive { attempt, error: &error });
            }
        }

        if attempt < max_attempts {
            self.observer
                .notify(MonitorEvent::Waiting(self.settings.poll_interval));
            tokio::time::sleep(self.settings.poll_interval).await;
        }

        Phase::Polling {
            attempt: attempt + 1,
            last_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use pipeline::{build_push_event, BuildNumber, JobError, TriggerAck};
    use tokio::time::Instant;

    use super::*;

    // -----------------------------------------------------------------------
    // Scripted client
    // -----------------------------------------------------------------------

    /// Returns pre-recorded answers and counts calls. Once the poll script is
    /// exhausted every further poll reports a running build.
    struct ScriptedClient {
        trigger: Result<TriggerAck, JobError>,
        polls: Mutex<VecDeque<Result<BuildStatus, JobError>>>,
        trigger_calls: AtomicU32,
        poll_calls: AtomicU32,
    }

    impl ScriptedClient {
        fn new(
            trigger: Result<TriggerAck, JobError>,
            polls: Vec<Result<BuildStatus, JobError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                trigger,
                polls: Mutex::new(polls.into()),
                trigger_calls: AtomicU32::new(0),
                poll_calls: AtomicU32::new(0),
            })
        }

        fn accepted(polls: Vec<Result<BuildStatus, JobError>>) -> Arc<Self> {
            Self::new(
                Ok(TriggerAck {
                    http_status: 201,
                    queue_item: None,
                }),
                polls,
            )
        }

        fn poll_calls(&self) -> u32 {
            self.poll_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobClient for ScriptedClient {
        async fn trigger_job(&self) -> Result<TriggerAck, JobError> {
            self.trigger_calls.fetch_add(1, Ordering::SeqCst);
            self.trigger.clone()
        }

        async fn fetch_status(&self) -> Result<BuildStatus, JobError> {
            self.poll_calls.fetch_add(1, Ordering::SeqCst);
            self.polls
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(running(None)))
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl MonitorObserver for Recorder {
        fn notify(&self, event: MonitorEvent<'_>) {
            let label = match event {
                MonitorEvent::Triggering => "triggering",
                MonitorEvent::Triggered(_) => "triggered",
                MonitorEvent::TriggerFailed(_) => "trigger_failed",
                MonitorEvent::Settling(_) => "settling",
                MonitorEvent::Polling { .. } => "polling",
                MonitorEvent::PollInconclusive { .. } => "inconclusive",
                MonitorEvent::StillBuilding { .. } => "building",
                MonitorEvent::BuildFinished { .. } => "finished_build",
                MonitorEvent::Waiting(_) => "waiting",
                MonitorEvent::Finished(_) => "finished",
            };
            self.0.lock().unwrap().push(label.to_owned());
        }
    }

    fn running(number: Option<u64>) -> BuildStatus {
        BuildStatus::from_parts(number, None, true)
    }

    fn done(number: u64, result: &str) -> BuildStatus {
        BuildStatus::from_parts(Some(number), Some(result), false)
    }

    fn malformed() -> JobError {
        JobError::Parse {
            message: "expected value at line 1 column 1".into(),
        }
    }

    // -----------------------------------------------------------------------
    // Trigger stage
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn trigger_failure_never_polls_or_sleeps() {
        let client = ScriptedClient::new(Err(JobError::Timeout { timeout_ms: 10_000 }), vec![]);
        let monitor = TriggerMonitor::new(client.clone(), MonitorSettings::default());

        let started = Instant::now();
        let report = monitor.run(&build_push_event()).await;

        assert_eq!(
            report.outcome,
            TriggerOutcome::TriggerFailed {
                error: JobError::Timeout { timeout_ms: 10_000 }
            }
        );
        assert_eq!(report.poll_attempts, 0);
        assert_eq!(client.poll_calls(), 0);
        assert_eq!(client.trigger_calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn rejected_trigger_is_a_trigger_failure() {
        let client = ScriptedClient::new(Err(JobError::Rejected { status: 401 }), vec![]);
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5))
            .run(&build_push_event())
            .await;

        assert!(!report.outcome.was_triggered());
        assert_eq!(client.poll_calls(), 0);
    }

    // -----------------------------------------------------------------------
    // Polling stage
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn first_poll_success_stops_immediately() {
        let client = ScriptedClient::accepted(vec![Ok(done(1, "SUCCESS"))]);
        let monitor = TriggerMonitor::new(client.clone(), MonitorSettings::default());

        let started = Instant::now();
        let report = monitor.run(&build_push_event()).await;

        assert_eq!(
            report.outcome,
            TriggerOutcome::Succeeded {
                build: Some(BuildNumber::new(1))
            }
        );
        assert_eq!(client.poll_calls(), 1);
        assert_eq!(report.poll_attempts, 1);
        // Only the settle delay elapsed.
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn endless_build_exhausts_exactly_the_budget() {
        let client = ScriptedClient::accepted(vec![]);
        let monitor = TriggerMonitor::new(client.clone(), MonitorSettings::default());

        let started = Instant::now();
        let report = monitor.run(&build_push_event()).await;

        assert_eq!(client.poll_calls(), 5);
        assert_eq!(report.poll_attempts, 5);
        assert_eq!(
            report.outcome,
            TriggerOutcome::Unresolved {
                cause: UnresolvedCause::BudgetExhausted {
                    last_status: Some(running(None))
                }
            }
        );
        // Settle delay plus four gaps; no sleep after the last attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 * 3));
    }

    #[tokio::test]
    async fn malformed_response_does_not_end_the_loop() {
        let client = ScriptedClient::accepted(vec![
            Err(malformed()),
            Err(JobError::Transport {
                message: "connection reset".into(),
            }),
            Ok(done(8, "SUCCESS")),
        ]);
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5))
            .run(&build_push_event())
            .await;

        assert_eq!(client.poll_calls(), 3);
        assert_eq!(report.outcome.label(), "succeeded");
    }

    #[tokio::test]
    async fn only_malformed_responses_exhaust_without_status() {
        let client = ScriptedClient::accepted((0..5).map(|_| Err(malformed())).collect());
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5))
            .run(&build_push_event())
            .await;

        assert_eq!(client.poll_calls(), 5);
        assert_eq!(
            report.outcome,
            TriggerOutcome::Unresolved {
                cause: UnresolvedCause::BudgetExhausted { last_status: None }
            }
        );
    }

    #[tokio::test]
    async fn running_then_failure_reports_build_number() {
        let client = ScriptedClient::accepted(vec![Ok(running(Some(42))), Ok(done(42, "FAILURE"))]);
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5))
            .run(&build_push_event())
            .await;

        assert_eq!(
            report.outcome,
            TriggerOutcome::Failed {
                build: Some(BuildNumber::new(42))
            }
        );
        assert_eq!(client.poll_calls(), 2);
        assert_eq!(report.poll_attempts, 2);
    }

    #[tokio::test]
    async fn unrecognised_result_ends_unresolved() {
        let client = ScriptedClient::accepted(vec![Ok(done(5, "ABORTED"))]);
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5))
            .run(&build_push_event())
            .await;

        assert!(matches!(
            report.outcome,
            TriggerOutcome::Unresolved {
                cause: UnresolvedCause::UnrecognisedResult { .. }
            }
        ));
        assert_eq!(client.poll_calls(), 1);
    }

    #[tokio::test]
    async fn zero_attempt_budget_is_unresolved_without_polling() {
        let client = ScriptedClient::accepted(vec![Ok(done(1, "SUCCESS"))]);
        let report = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(0))
            .run(&build_push_event())
            .await;

        assert_eq!(client.poll_calls(), 0);
        assert_eq!(report.poll_attempts, 0);
        assert_eq!(report.outcome.label(), "unresolved");
    }

    // -----------------------------------------------------------------------
    // State machine and narration
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn terminal_phase_is_absorbing() {
        let client = ScriptedClient::accepted(vec![]);
        let monitor = TriggerMonitor::new(client.clone(), MonitorSettings::immediate(5));
        let terminal = Phase::Terminal(TriggerOutcome::Failed { build: None });

        let next = monitor.step(terminal.clone()).await;

        assert_eq!(next, terminal);
        assert_eq!(client.trigger_calls.load(Ordering::SeqCst), 0);
        assert_eq!(client.poll_calls(), 0);
    }

    #[tokio::test]
    async fn observer_sees_every_phase_in_order() {
        let client = ScriptedClient::accepted(vec![Err(malformed()), Ok(done(2, "SUCCESS"))]);
        let recorder = Arc::new(Recorder::default());
        TriggerMonitor::new(client, MonitorSettings::immediate(5))
            .with_observer(recorder.clone())
            .run(&build_push_event())
            .await;

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(
            events,
            [
                "triggering",
                "triggered",
                "settling",
                "polling",
                "inconclusive",
                "waiting",
                "polling",
                "finished_build",
                "finished",
            ]
        );
    }
}
