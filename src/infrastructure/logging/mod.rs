//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - Pretty or JSON stderr output
//! - JSON log files with rotation

pub mod logger;

pub use logger::LoggerImpl;
