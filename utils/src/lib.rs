//! Shared utilities for the retarget workspace.

pub mod logging;

pub use logging::{init_logging, try_init_test_tracing, LogFormat, LOG_FORMAT_ENV};
