use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{BuildStatus, Credentials, JobClient, JobEndpoint, JobError, TriggerAck};
use reqwest::{header, Client, RequestBuilder, Response};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::wire::{parse_last_build, queue_item_from_location};

/// Errors raised while constructing a [`JenkinsClient`].
#[derive(Debug, Error)]
pub enum JenkinsClientError {
    /// The underlying HTTP client could not be initialised (TLS backend
    /// failure).
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// HTTP client bound to one Jenkins job.
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    http: Client,
    endpoint: JobEndpoint,
    credentials: Credentials,
    timeout: Duration,
}

impl JenkinsClient {
    /// Per-request timeout used by [`JenkinsClient::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client with the default 10 second request timeout.
    pub fn new(endpoint: JobEndpoint, credentials: Credentials) -> Result<Self, JenkinsClientError> {
        Self::with_timeout(endpoint, credentials, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a client whose every request is bounded by `timeout`, from
    /// connect to the end of the response body.
    pub fn with_timeout(
        endpoint: JobEndpoint,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, JenkinsClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("buildhook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(JenkinsClientError::HttpClient)?;

        Ok(Self {
            http,
            endpoint,
            credentials,
            timeout,
        })
    }

    /// Per-request timeout the client was built with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the trigger call.
    pub fn trigger_url(&self) -> String {
        self.endpoint.join("build")
    }

    /// URL of the status call.
    pub fn status_url(&self) -> String {
        self.endpoint.join("lastBuild/api/json")
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// Sends `request` and turns transport failures and non-2xx statuses into
    /// [`JobError`]s.
    async fn send(&self, request: RequestBuilder) -> Result<Response, JobError> {
        let response = self
            .authed(request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        debug!(http_status = status.as_u16(), "response received");
        if !status.is_success() {
            return Err(JobError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn transport_error(&self, error: &reqwest::Error) -> JobError {
        if error.is_timeout() {
            return JobError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            };
        }

        // reqwest's own message omits the cause ("error sending request");
        // append the source chain so "connection refused" reaches the logs.
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        JobError::Transport { message }
    }
}

#[async_trait]
impl JobClient for JenkinsClient {
    #[instrument(skip(self), fields(url = %self.trigger_url()))]
    async fn trigger_job(&self) -> Result<TriggerAck, JobError> {
        let response = self.send(self.http.post(self.trigger_url())).await?;

        let queue_item = response
            .headers()
            .get(header::LOCATION)
            .and_then(|loc| loc.to_str().ok())
            .and_then(queue_item_from_location);

        Ok(TriggerAck {
            http_status: response.status().as_u16(),
            queue_item,
        })
    }

    #[instrument(skip(self), fields(url = %self.status_url()))]
    async fn fetch_status(&self) -> Result<BuildStatus, JobError> {
        let response = self
            .send(
                self.http
                    .get(self.status_url())
                    .header(header::ACCEPT, "application/json"),
            )
            .await?;

        let body = response.text().await.map_err(|e| self.transport_error(&e))?;
        parse_last_build(&body)
    }
}
