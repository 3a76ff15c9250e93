//! Producer-side handle for recording stream arrivals.

use std::sync::Arc;
use std::time::Instant;

use crate::state::MonitorState;

/// A cloneable handle for reporting message arrivals on one stream.
///
/// This is the interface the transport layer drives: call [`record`] once
/// per inbound message. Only the arrival time is consumed; the message
/// payload is never inspected.
///
/// Handles are cheap to clone and safe to use from any thread or task
/// concurrently with the monitor's own evaluation loop.
///
/// # Example
///
/// ```rust
/// use pulsewatch::{StreamConfig, StreamMonitor};
///
/// let monitor = StreamMonitor::new(&StreamConfig {
///     name: "lidar".into(),
///     source: "scan".into(),
///     min_freq: 10.0,
///     use_average: false,
///     eval_rate: 10.0,
/// })
/// .unwrap();
///
/// let recorder = monitor.recorder();
/// recorder.record(); // once per inbound message
/// ```
///
/// [`record`]: ArrivalRecorder::record
#[derive(Clone)]
pub struct ArrivalRecorder {
    pub(crate) state: Arc<MonitorState>,
    pub(crate) name: String,
}

impl ArrivalRecorder {
    /// Record an arrival at the current instant.
    pub fn record(&self) {
        self.state.record(Instant::now());
    }

    /// Record an arrival at a specific instant.
    ///
    /// Useful when the receipt time was captured before handing the message
    /// off, or for driving tests with an injected schedule.
    pub fn record_at(&self, at: Instant) {
        self.state.record(at);
    }

    /// Name of the stream this recorder feeds.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for ArrivalRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrivalRecorder")
            .field("name", &self.name)
            .finish()
    }
}
