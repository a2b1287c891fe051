//! # botmetrics common
//!
//! Shared wire types, the error taxonomy, and logging bootstrap used by every
//! crate in the botmetrics workspace.

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::{ErrorKind, MetricsError, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use types::*;
