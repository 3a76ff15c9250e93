//! Error types for the watchdog.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring or starting the watchdog.
///
/// All of these are startup-time conditions. Evaluation itself never fails:
/// a stream that cannot demonstrate an adequate arrival rate is reported as
/// unhealthy, which is the designed signal path rather than an error.
#[derive(Debug, Error)]
pub enum WatchdogError {
    /// Could not read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON or is missing required fields.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but contains an invalid value.
    #[error("invalid configuration: {0}")]
    Config(String),
}
