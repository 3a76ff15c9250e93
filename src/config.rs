//! Configuration surface for the watchdog.
//!
//! Configuration is a single JSON document: a global supervisory rate plus
//! one entry per monitored stream. Every field is required; a missing field
//! is a fatal startup error, never a runtime condition.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WatchdogError;

/// A frequency is only usable if its reciprocal fits in a `Duration`;
/// positive-and-finite alone admits values like 1e-300 whose period
/// overflows.
fn period_of(hz: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / hz).ok()
}

/// Configuration for one monitored stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Human-readable display name, used in status reports.
    pub name: String,

    /// Transport source identifier the stream's messages arrive on.
    pub source: String,

    /// Minimum acceptable message frequency in Hz. Must be > 0.
    pub min_freq: f64,

    /// Evaluation policy: false = strict (fail on any single oversized
    /// gap), true = windowed average (fail only when the mean gap is
    /// oversized).
    pub use_average: bool,

    /// Ceiling on the verdict recomputation rate in Hz. The effective
    /// evaluation rate is `min(min_freq, eval_rate)`. Must be > 0.
    pub eval_rate: f64,
}

impl StreamConfig {
    /// Validate field values. Presence is already enforced by deserialization.
    pub fn validate(&self) -> Result<(), WatchdogError> {
        if self.name.is_empty() {
            return Err(WatchdogError::Config("stream name must not be empty".into()));
        }
        if self.source.is_empty() {
            return Err(WatchdogError::Config(format!(
                "stream '{}': source must not be empty",
                self.name
            )));
        }
        if !(self.min_freq > 0.0) || !self.min_freq.is_finite() {
            return Err(WatchdogError::Config(format!(
                "stream '{}': min_freq must be a positive number, got {}",
                self.name, self.min_freq
            )));
        }
        if period_of(self.min_freq).is_none() {
            return Err(WatchdogError::Config(format!(
                "stream '{}': min_freq {} is too low to derive an inter-arrival interval",
                self.name, self.min_freq
            )));
        }
        if !(self.eval_rate > 0.0) || !self.eval_rate.is_finite() {
            return Err(WatchdogError::Config(format!(
                "stream '{}': eval_rate must be a positive number, got {}",
                self.name, self.eval_rate
            )));
        }
        if period_of(self.eval_rate).is_none() {
            return Err(WatchdogError::Config(format!(
                "stream '{}': eval_rate {} is too low to derive an evaluation period",
                self.name, self.eval_rate
            )));
        }
        Ok(())
    }
}

/// Top-level watchdog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Supervisory rate in Hz: how often verdicts are aggregated and
    /// published. Must be > 0.
    pub rate: f64,

    /// The streams to monitor, in publication order.
    pub streams: Vec<StreamConfig>,
}

impl WatchdogConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WatchdogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| WatchdogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|source| WatchdogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all field values, including cross-stream constraints.
    pub fn validate(&self) -> Result<(), WatchdogError> {
        if !(self.rate > 0.0) || !self.rate.is_finite() {
            return Err(WatchdogError::Config(format!(
                "rate must be a positive number, got {}",
                self.rate
            )));
        }
        if period_of(self.rate).is_none() {
            return Err(WatchdogError::Config(format!(
                "rate {} is too low to derive a supervisory period",
                self.rate
            )));
        }
        for stream in &self.streams {
            stream.validate()?;
        }
        // Arrivals are routed by source id, so duplicates would be ambiguous.
        for (i, stream) in self.streams.iter().enumerate() {
            if self.streams[..i].iter().any(|s| s.source == stream.source) {
                return Err(WatchdogError::Config(format!(
                    "duplicate source '{}'",
                    stream.source
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_stream(name: &str, source: &str) -> StreamConfig {
        StreamConfig {
            name: name.to_string(),
            source: source.to_string(),
            min_freq: 10.0,
            use_average: false,
            eval_rate: 10.0,
        }
    }

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_valid_config() {
        let file = write_config(
            r#"{
                "rate": 10.0,
                "streams": [
                    {"name": "lidar", "source": "scan", "min_freq": 10.0, "use_average": false, "eval_rate": 10.0},
                    {"name": "imu", "source": "imu/data", "min_freq": 100.0, "use_average": true, "eval_rate": 10.0}
                ]
            }"#,
        );

        let config = WatchdogConfig::load(file.path()).unwrap();
        assert_eq!(config.rate, 10.0);
        assert_eq!(config.streams.len(), 2);
        assert_eq!(config.streams[0].name, "lidar");
        assert!(config.streams[1].use_average);
    }

    #[test]
    fn missing_field_is_fatal() {
        // min_freq absent
        let file = write_config(
            r#"{
                "rate": 10.0,
                "streams": [
                    {"name": "lidar", "source": "scan", "use_average": false, "eval_rate": 10.0}
                ]
            }"#,
        );

        let err = WatchdogConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, WatchdogError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = WatchdogConfig::load("/nonexistent/watchdog.json").unwrap_err();
        assert!(matches!(err, WatchdogError::Io { .. }));
    }

    #[test]
    fn zero_min_freq_rejected() {
        let mut stream = sample_stream("lidar", "scan");
        stream.min_freq = 0.0;
        assert!(matches!(stream.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn negative_eval_rate_rejected() {
        let mut stream = sample_stream("lidar", "scan");
        stream.eval_rate = -1.0;
        assert!(matches!(stream.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn vanishing_min_freq_rejected() {
        // Positive and finite, but its period overflows a Duration.
        let mut stream = sample_stream("lidar", "scan");
        stream.min_freq = 1e-300;
        assert!(matches!(stream.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn vanishing_eval_rate_rejected() {
        let mut stream = sample_stream("lidar", "scan");
        stream.eval_rate = 1e-300;
        assert!(matches!(stream.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn vanishing_supervisory_rate_rejected() {
        let config = WatchdogConfig {
            rate: 1e-300,
            streams: vec![],
        };
        assert!(matches!(config.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn empty_name_rejected() {
        let stream = sample_stream("", "scan");
        assert!(matches!(stream.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn zero_supervisory_rate_rejected() {
        let config = WatchdogConfig {
            rate: 0.0,
            streams: vec![],
        };
        assert!(matches!(config.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn duplicate_sources_rejected() {
        let config = WatchdogConfig {
            rate: 10.0,
            streams: vec![sample_stream("a", "scan"), sample_stream("b", "scan")],
        };
        assert!(matches!(config.validate(), Err(WatchdogError::Config(_))));
    }

    #[test]
    fn empty_stream_list_is_valid() {
        let config = WatchdogConfig {
            rate: 10.0,
            streams: vec![],
        };
        assert!(config.validate().is_ok());
    }
}
