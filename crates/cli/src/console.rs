//! Human-readable narration on stdout.
//!
//! Purely advisory: nothing here feeds back into the run. Structured logs are
//! emitted separately by the `tracing` instrumentation in each crate.

use monitor::{MonitorEvent, MonitorObserver, MonitorReport};
use pipeline::{JobEndpoint, PushEvent, TriggerOutcome, UnresolvedCause};

/// Renders the summary lines of a push event.
pub fn event_summary(event: &PushEvent) -> Vec<String> {
    let head = event.head_commit();
    vec![
        format!("  Repository: {}", event.repository().full_name),
        format!("  Branch:     {}", event.branch_name()),
        format!("  Commit:     {}", head.id),
        format!("  Message:    {}", head.message),
        format!("  Author:     {}", event.pusher().name),
        format!("  Changes:    {} file(s)", head.changed_path_count()),
    ]
}

/// Renders one monitor event, or `None` for events not worth a line.
pub fn describe(event: MonitorEvent<'_>) -> Option<String> {
    let line = match event {
        MonitorEvent::Triggering => "Triggering pipeline...".to_owned(),
        MonitorEvent::Triggered(ack) => match ack.queue_item {
            Some(item) => format!("Job triggered (HTTP {}, queue item {item})", ack.http_status),
            None => format!("Job triggered (HTTP {})", ack.http_status),
        },
        MonitorEvent::TriggerFailed(error) => format!("Failed to trigger job: {error}"),
        MonitorEvent::Settling(delay) if delay.is_zero() => return None,
        MonitorEvent::Settling(delay) => {
            format!("Waiting {:.1}s for the build to register...", delay.as_secs_f64())
        }
        MonitorEvent::Polling {
            attempt,
            max_attempts,
        } => format!("Checking pipeline status ({attempt}/{max_attempts})..."),
        MonitorEvent::PollInconclusive { error, .. } => {
            format!("Could not read pipeline status: {error}")
        }
        MonitorEvent::StillBuilding { status, .. } => match status.number {
            Some(n) => format!("Build #{n} is currently running..."),
            None => "Build is currently running...".to_owned(),
        },
        MonitorEvent::BuildFinished { status, .. } => {
            let number = status
                .number
                .map_or_else(|| "?".to_owned(), |n| n.to_string());
            format!("Build #{number} completed with status: {}", status.result)
        }
        MonitorEvent::Waiting(_) => "Waiting for pipeline to complete...".to_owned(),
        MonitorEvent::Finished(_) => return None,
    };
    Some(line)
}

/// Renders the final verdict of a run.
pub fn outcome_line(outcome: &TriggerOutcome) -> String {
    match outcome {
        TriggerOutcome::Succeeded { .. } => "Pipeline completed successfully!".to_owned(),
        TriggerOutcome::Failed { .. } => "Pipeline failed!".to_owned(),
        TriggerOutcome::Unresolved {
            cause: UnresolvedCause::UnrecognisedResult { result, .. },
        } => format!("Pipeline completed with status: {result}"),
        TriggerOutcome::Unresolved {
            cause: UnresolvedCause::BudgetExhausted { .. },
        } => "Pipeline still not finished; stopped polling.".to_owned(),
        TriggerOutcome::TriggerFailed { .. } => "Pipeline trigger failed. Exiting...".to_owned(),
    }
}

/// Observer that prints each monitor event as it happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNarrator;

impl MonitorObserver for ConsoleNarrator {
    fn notify(&self, event: MonitorEvent<'_>) {
        if let Some(line) = describe(event) {
            println!("{line}");
        }
    }
}

pub fn print_event(event: &PushEvent) {
    println!("Simulating git push event...");
    for line in event_summary(event) {
        println!("{line}");
    }
}

pub fn print_report(report: &MonitorReport, endpoint: &JobEndpoint) {
    println!("{}", outcome_line(&report.outcome));
    if report.outcome.was_triggered() {
        println!("Status checks: {}", report.poll_attempts);
    }
    println!("Job: {endpoint}");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pipeline::{build_push_event, BuildNumber, BuildStatus, JobError, TriggerAck};

    use super::*;

    #[test]
    fn summary_lists_the_head_commit() {
        let lines = event_summary(&build_push_event());
        assert_eq!(lines[0], "  Repository: Navpan18/ShopSphere");
        assert_eq!(lines[1], "  Branch:     main");
        assert_eq!(lines[2], "  Commit:     def456new");
        assert_eq!(lines[4], "  Author:     developer");
        assert_eq!(lines[5], "  Changes:    3 file(s)");
    }

    #[test]
    fn describes_progress_events() {
        let ack = TriggerAck {
            http_status: 201,
            queue_item: None,
        };
        assert_eq!(
            describe(MonitorEvent::Triggered(&ack)).as_deref(),
            Some("Job triggered (HTTP 201)")
        );

        let running = BuildStatus::from_parts(Some(42), None, true);
        assert_eq!(
            describe(MonitorEvent::StillBuilding {
                attempt: 1,
                status: &running
            })
            .as_deref(),
            Some("Build #42 is currently running...")
        );

        let done = BuildStatus::from_parts(Some(42), Some("FAILURE"), false);
        assert_eq!(
            describe(MonitorEvent::BuildFinished {
                attempt: 2,
                status: &done
            })
            .as_deref(),
            Some("Build #42 completed with status: FAILURE")
        );

        let error = JobError::Rejected { status: 401 };
        assert_eq!(
            describe(MonitorEvent::TriggerFailed(&error)).as_deref(),
            Some("Failed to trigger job: server rejected the request with HTTP 401")
        );
    }

    #[test]
    fn zero_delays_and_the_finish_event_are_silent() {
        assert_eq!(describe(MonitorEvent::Settling(Duration::ZERO)), None);
        let outcome = TriggerOutcome::Succeeded { build: None };
        assert_eq!(describe(MonitorEvent::Finished(&outcome)), None);
    }

    #[test]
    fn outcome_lines_keep_unresolved_distinct() {
        assert_eq!(
            outcome_line(&TriggerOutcome::Failed {
                build: Some(BuildNumber::new(42))
            }),
            "Pipeline failed!"
        );
        assert_eq!(
            outcome_line(&TriggerOutcome::Unresolved {
                cause: UnresolvedCause::BudgetExhausted { last_status: None }
            }),
            "Pipeline still not finished; stopped polling."
        );
    }
}
