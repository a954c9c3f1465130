//! buildhook CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `buildhook.toml` (or `--config`), fold in
//!    flags and `BUILDHOOK_*` variables, and validate the result.
//! 2. **Wire observability**: configure `tracing-subscriber` (text or JSON) and,
//!    when `--otlp-endpoint` is given, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: build the [`jenkins::JenkinsClient`] and
//!    inject it into a [`monitor::TriggerMonitor`].
//! 4. **Report**: narrate progress on stdout and map the outcome to the exit
//!    status.
//!
//! ## Exit status
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | The build was triggered and monitored to an outcome (any outcome) |
//! | 1 | The trigger call failed |
//! | 2 | Invalid configuration or another setup error |

mod config;
mod console;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use jenkins::JenkinsClient;
use monitor::TriggerMonitor;
use pipeline::{Timestamp, TriggerOutcome};
use tracing::{debug, error, info};

use crate::config::{EventOverrides, FileConfig, JobOverrides};

#[derive(Debug, Parser)]
#[command(name = "buildhook")]
#[command(version, about = "Trigger a CI job for a push event and follow it to completion")]
struct Cli {
    /// Configuration file (defaults to ./buildhook.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Export spans to this OTLP/gRPC collector
    #[arg(long, global = true, env = "BUILDHOOK_OTLP_ENDPOINT", value_name = "URL")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a push event, trigger the job, and poll it until it finishes
    Run {
        #[command(flatten)]
        job: JobOverrides,
        #[command(flatten)]
        event: EventOverrides,
    },
    /// Print the push event payload as JSON
    Event {
        #[command(flatten)]
        event: EventOverrides,
    },
}

/// Process exit status, see the table in the crate docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitStatus {
    /// The run reached an outcome, or there was nothing to run.
    Completed,
    /// The trigger call failed; no build was monitored.
    TriggerFailed,
    /// Configuration or setup failed before anything was sent.
    SetupFailed,
}

impl ExitStatus {
    fn for_outcome(outcome: &TriggerOutcome) -> Self {
        if outcome.was_triggered() {
            Self::Completed
        } else {
            Self::TriggerFailed
        }
    }

    /// Reports a setup error and maps it to [`ExitStatus::SetupFailed`].
    fn from_result(result: anyhow::Result<Self>) -> Self {
        result.unwrap_or_else(|e| {
            error!(error = ?e, "buildhook failed");
            eprintln!("error: {e:#}");
            Self::SetupFailed
        })
    }

    fn code(self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::TriggerFailed => 1,
            Self::SetupFailed => 2,
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _telemetry = match telemetry::init(cli.json, cli.verbose, cli.otlp_endpoint.as_deref()) {
        Ok(guard) => guard,
        Err(e) => return ExitStatus::from_result(Err(e)).into(),
    };

    ExitStatus::from_result(execute(cli).await).into()
}

async fn execute(cli: Cli) -> anyhow::Result<ExitStatus> {
    let mut file = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Event { event } => {
            file.apply_event_overrides(&event);
            let payload = file.event_template()?.build(Timestamp::now());
            println!("{}", payload.to_json_pretty().context("failed to serialise event")?);
            Ok(ExitStatus::Completed)
        }
        Command::Run { job, event } => {
            file.apply_job_overrides(&job);
            file.apply_event_overrides(&event);
            run(file).await
        }
    }
}

async fn run(file: FileConfig) -> anyhow::Result<ExitStatus> {
    let config = file.into_run_config()?;
    info!(
        job = %config.endpoint,
        user = %config.credentials.username,
        max_attempts = config.settings.max_attempts,
        max_wait_ms = config.settings.total_sleep_budget().as_millis() as u64,
        "configuration loaded"
    );

    let event = config.event.build(Timestamp::now());
    console::print_event(&event);

    let client = JenkinsClient::with_timeout(
        config.endpoint.clone(),
        config.credentials,
        config.request_timeout,
    )?;
    debug!(timeout_ms = client.timeout().as_millis() as u64, "job client ready");
    let monitor = TriggerMonitor::new(client, config.settings)
        .with_observer(Arc::new(console::ConsoleNarrator));

    let report = monitor.run(&event).await;
    console::print_report(&report, &config.endpoint);

    Ok(ExitStatus::for_outcome(&report.outcome))
}
