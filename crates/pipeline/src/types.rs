//! Shared value types for the buildhook domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (an endpoint is an absolute HTTP(S) URL without a
//! trailing slash, credentials never print their secret).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

// ---------------------------------------------------------------------------
// Job endpoint
// ---------------------------------------------------------------------------

/// Base URL of one named job on the CI server
/// (e.g. `http://localhost:9090/job/ShopSphere-Simple`).
///
/// The trigger and status URLs are derived from it by appending a path, so the
/// stored value never ends with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobEndpoint(String);

impl JobEndpoint {
    /// Creates a [`JobEndpoint`], returning `None` unless `url` parses as an
    /// absolute `http://` or `https://` URL with a non-empty host.
    ///
    /// The stored form is the normalised URL (lower-case host, default port
    /// dropped) without trailing slashes.
    pub fn new(url: impl AsRef<str>) -> Option<Self> {
        let parsed = Url::parse(url.as_ref().trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return None;
        }
        Some(Self(parsed.as_str().trim_end_matches('/').to_owned()))
    }

    /// Returns the endpoint as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends `path` (with or without a leading `/`) to the endpoint.
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl TryFrom<String> for JobEndpoint {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or_else(|| format!("invalid job endpoint URL: '{value}'"))
    }
}

impl From<JobEndpoint> for String {
    fn from(value: JobEndpoint) -> Self {
        value.0
    }
}

impl std::fmt::Display for JobEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Username/password pair used for HTTP basic authentication on every call to
/// the CI server.
///
/// `Debug` redacts the password so credentials can sit inside logged
/// configuration structs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Password or API token.
    pub password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly. Serialises as an ISO-8601 / RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
