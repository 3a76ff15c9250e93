//! Per-stream rate monitor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::StreamConfig;
use crate::error::WatchdogError;
use crate::recorder::ArrivalRecorder;
use crate::state::MonitorState;

/// Monitors the arrival rate of one stream and derives a boolean verdict.
///
/// A monitor owns a rolling buffer of arrival instants fed by one or more
/// [`ArrivalRecorder`] handles, and periodically evaluates the buffered
/// inter-arrival gaps against the configured minimum frequency. The verdict
/// starts unhealthy and is re-derived on every evaluation pass; a stream
/// that stops producing settles back to unhealthy within one evaluation
/// period.
///
/// Monitors are independent of each other; the supervisor only reads their
/// verdicts.
#[derive(Debug)]
pub struct StreamMonitor {
    name: String,
    source: String,
    min_interval: Duration,
    use_average: bool,
    eval_period: Duration,
    state: Arc<MonitorState>,
}

impl StreamMonitor {
    /// Create a monitor from a validated stream configuration.
    pub fn new(config: &StreamConfig) -> Result<Self, WatchdogError> {
        config.validate()?;

        // Evaluation never runs slower than the minimum acceptable message
        // rate (so at least one pass occurs per required inter-arrival
        // interval) and never faster than the configured ceiling.
        let run_freq = config.min_freq.min(config.eval_rate);

        Ok(Self {
            name: config.name.clone(),
            source: config.source.clone(),
            min_interval: Duration::from_secs_f64(1.0 / config.min_freq),
            use_average: config.use_average,
            eval_period: Duration::from_secs_f64(1.0 / run_freq),
            state: Arc::new(MonitorState::new()),
        })
    }

    /// Display name of the monitored stream.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transport source identifier the stream's messages arrive on.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Minimum acceptable inter-arrival interval (1 / min_freq).
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Interval between evaluation passes.
    pub fn eval_period(&self) -> Duration {
        self.eval_period
    }

    /// Current verdict. Lock-free; never waits on an evaluation pass.
    pub fn status(&self) -> bool {
        self.state.healthy()
    }

    /// Hand out a producer-side handle for recording arrivals.
    pub fn recorder(&self) -> ArrivalRecorder {
        ArrivalRecorder {
            state: self.state.clone(),
            name: self.name.clone(),
        }
    }

    /// Record one arrival at the given instant.
    pub fn record_arrival(&self, at: Instant) {
        self.state.record(at);
    }

    /// Run one evaluation pass now and return the new verdict.
    ///
    /// Normally driven by the background loop; exposed for manual driving
    /// and tests.
    pub fn evaluate(&self) -> bool {
        self.state.evaluate(self.min_interval, self.use_average)
    }

    /// Spawn the background evaluation loop.
    ///
    /// Ticks at the effective evaluation rate until the shutdown channel
    /// flips to true. The shutdown condition is checked at least once per
    /// tick; a partial tick may be abandoned.
    pub(crate) fn spawn_eval_loop(
        self: Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.eval_period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.evaluate();
                    }
                    res = shutdown.changed() => {
                        // A closed channel can never deliver a stop signal;
                        // exit instead of re-polling the dead branch.
                        if res.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!(stream = %self.name, "evaluation loop stopped");
        })
    }
}
