//! # botmetrics client
//!
//! HTTP client for the metrics backend and the [`MetricsSession`] that turns
//! fetched series into a published dashboard view.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod session;

pub use client::{ClientConfig, MetricsClient, METRICS_ENDPOINT};
pub use session::{MetricsSession, RefreshOutcome};
