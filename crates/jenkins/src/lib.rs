//! buildhook Jenkins adapter.
//!
//! Implements the [`pipeline::JobClient`] trait over the Jenkins remote access
//! API:
//!
//! - trigger: `POST {job}/build`
//! - status: `GET {job}/lastBuild/api/json`
//!
//! Both calls use HTTP basic authentication and the client-wide request
//! timeout.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL layout, authentication, timeouts, and response
//! parsing all live here. The [`pipeline`] crate sees only
//! [`pipeline::JobClient`] and [`pipeline::JobError`].

mod client;
mod wire;

pub use client::{JenkinsClient, JenkinsClientError};
