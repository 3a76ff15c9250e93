//! Status report - a point-in-time view of stream liveness.

use alloc::string::String;
use alloc::vec::Vec;

use crate::SchemaVersion;

/// Health verdict for a single monitored stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct StreamStatus {
    /// Human-readable stream name.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub name: String,

    /// Whether the stream currently meets its minimum arrival rate.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub healthy: bool,
}

impl StreamStatus {
    /// Create a new stream status.
    pub fn new(name: impl Into<String>, healthy: bool) -> Self {
        Self {
            name: name.into(),
            healthy,
        }
    }
}

/// A point-in-time report of watchdog state.
///
/// This is the top-level type the supervisor publishes on every tick. It
/// carries the per-stream verdicts in monitor order plus the aggregate
/// status (the logical AND of all verdicts).
///
/// # Example
///
/// ```rust
/// use pulsewatch_types::StatusReport;
///
/// let report = StatusReport::builder()
///     .stream("lidar", true)
///     .stream("odometry", true)
///     .build();
///
/// assert!(report.healthy);
///
/// // Serialize with serde (requires "serde" feature)
/// // let json = serde_json::to_string(&report)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "minicbor", derive(minicbor::Encode, minicbor::Decode))]
pub struct StatusReport {
    /// Schema version for forward compatibility.
    #[cfg_attr(feature = "minicbor", n(0))]
    pub version: SchemaVersion,

    /// Unix timestamp in milliseconds when this report was taken.
    #[cfg_attr(feature = "minicbor", n(1))]
    pub timestamp_ms: u64,

    /// Aggregate status: true iff every stream verdict is true.
    ///
    /// With zero monitored streams this is vacuously true.
    #[cfg_attr(feature = "minicbor", n(2))]
    pub healthy: bool,

    /// Per-stream verdicts, in monitor order.
    #[cfg_attr(feature = "minicbor", n(3))]
    pub streams: Vec<StreamStatus>,
}

impl StatusReport {
    /// Create an empty report with the current timestamp.
    ///
    /// An empty report is vacuously healthy.
    #[cfg(feature = "std")]
    pub fn new() -> Self {
        Self {
            version: SchemaVersion::CURRENT,
            timestamp_ms: current_timestamp_ms(),
            healthy: true,
            streams: Vec::new(),
        }
    }

    /// Create a builder for constructing reports.
    pub fn builder() -> StatusReportBuilder {
        StatusReportBuilder::new()
    }

    /// Check if the report is empty (no streams).
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Number of streams in the report.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Get the verdict for a specific stream by name.
    pub fn get(&self, name: &str) -> Option<bool> {
        self.streams.iter().find(|s| s.name == name).map(|s| s.healthy)
    }

    /// Iterate over all stream verdicts.
    pub fn iter(&self) -> impl Iterator<Item = &StreamStatus> {
        self.streams.iter()
    }

    /// Names of streams currently failing their rate check.
    pub fn unhealthy_streams(&self) -> impl Iterator<Item = &str> {
        self.streams.iter().filter(|s| !s.healthy).map(|s| s.name.as_str())
    }
}

#[cfg(feature = "std")]
impl Default for StatusReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing `StatusReport` instances.
///
/// The aggregate is derived at build time as the AND of all added verdicts;
/// an empty builder yields a vacuously healthy report.
#[derive(Debug, Default)]
pub struct StatusReportBuilder {
    timestamp_ms: Option<u64>,
    streams: Vec<StreamStatus>,
}

impl StatusReportBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a stream verdict. Order of calls is preserved in the report.
    pub fn stream(mut self, name: impl Into<String>, healthy: bool) -> Self {
        self.streams.push(StreamStatus::new(name, healthy));
        self
    }

    /// Add a pre-built stream status.
    pub fn stream_status(mut self, status: StreamStatus) -> Self {
        self.streams.push(status);
        self
    }

    /// Build the report.
    #[cfg(feature = "std")]
    pub fn build(self) -> StatusReport {
        let healthy = self.streams.iter().all(|s| s.healthy);
        StatusReport {
            version: SchemaVersion::CURRENT,
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            healthy,
            streams: self.streams,
        }
    }

    /// Build the report with a specific timestamp (for no_std).
    #[cfg(not(feature = "std"))]
    pub fn build(self) -> StatusReport {
        let healthy = self.streams.iter().all(|s| s.healthy);
        StatusReport {
            version: SchemaVersion::CURRENT,
            timestamp_ms: self.timestamp_ms.unwrap_or(0),
            healthy,
            streams: self.streams,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
#[cfg(feature = "std")]
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
