//! Utility functions and helpers.

pub mod error_log;
pub mod http;

pub use error_log::{ErrorLog, ErrorLogEntry};
