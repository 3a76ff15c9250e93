//! The watchdog supervisor: aggregation, publication, and loop control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};

use pulsewatch_types::StatusReport;

use crate::config::{StreamConfig, WatchdogConfig};
use crate::error::WatchdogError;
use crate::gate::CommandGate;
use crate::monitor::StreamMonitor;
use crate::output::Output;
use crate::recorder::ArrivalRecorder;

/// The watchdog supervisor.
///
/// Owns one [`StreamMonitor`] per configured stream, polls their verdicts
/// at the supervisory rate, ANDs them into the aggregate status, and
/// publishes a [`StatusReport`] to every configured output. The aggregate
/// is shared with [`CommandGate`] handles through a single atomic: the
/// supervisor is its only writer.
///
/// # Example
///
/// ```rust,no_run
/// use pulsewatch::{Output, StreamConfig, Watchdog};
/// use pulsewatch_types::VelocityCommand;
///
/// #[tokio::main]
/// async fn main() -> Result<(), pulsewatch::WatchdogError> {
///     let watchdog = Watchdog::builder()
///         .rate(10.0)
///         .stream(StreamConfig {
///             name: "lidar".into(),
///             source: "scan".into(),
///             min_freq: 10.0,
///             use_average: false,
///             eval_rate: 10.0,
///         })
///         .output(Output::file("status.json"))
///         .build()?;
///
///     let recorder = watchdog.recorder("scan").unwrap();
///     let gate = watchdog.gate::<VelocityCommand>();
///
///     let handle = watchdog.start();
///
///     // transport layer: recorder.record() per message,
///     // gate.apply(cmd) per command
///
///     handle.stop();
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Watchdog {
    monitors: Vec<Arc<StreamMonitor>>,
    outputs: Arc<Vec<Output>>,
    period: Duration,
    aggregate: Arc<AtomicBool>,
}

impl Watchdog {
    /// Create a builder for configuring the watchdog.
    pub fn builder() -> WatchdogBuilder {
        WatchdogBuilder::new()
    }

    /// Build a watchdog with no outputs from a loaded configuration.
    pub fn from_config(config: &WatchdogConfig) -> Result<Self, WatchdogError> {
        let mut builder = Self::builder().rate(config.rate);
        for stream in &config.streams {
            builder = builder.stream(stream.clone());
        }
        builder.build()
    }

    /// The monitors, in configuration order.
    pub fn monitors(&self) -> &[Arc<StreamMonitor>] {
        &self.monitors
    }

    /// Interval between supervisory ticks.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Look up the arrival recorder for a stream by its source identifier.
    pub fn recorder(&self, source: &str) -> Option<ArrivalRecorder> {
        self.monitors
            .iter()
            .find(|m| m.source() == source)
            .map(|m| m.recorder())
    }

    /// Create a command gate sharing this watchdog's aggregate status.
    ///
    /// The gate observes the aggregate as of the last [`poll`](Self::poll);
    /// before the first poll it is closed (fail-safe).
    pub fn gate<T>(&self) -> CommandGate<T> {
        CommandGate::new(self.aggregate.clone())
    }

    /// Poll every monitor's verdict, update the shared aggregate, and build
    /// a status report.
    ///
    /// The aggregate is the logical AND of all current verdicts; with zero
    /// monitors it is vacuously true.
    pub fn poll(&self) -> StatusReport {
        let mut builder = StatusReport::builder();
        let mut aggregate = true;

        for monitor in &self.monitors {
            let healthy = monitor.status();
            aggregate = aggregate && healthy;
            builder = builder.stream(monitor.name(), healthy);
        }

        self.aggregate.store(aggregate, Ordering::Release);
        builder.build()
    }

    /// Poll and publish a report to all outputs immediately.
    pub async fn emit_now(&self) {
        let report = self.poll();
        for output in self.outputs.iter() {
            let _ = output.emit(&report).await;
        }
    }

    /// Start all background activity.
    ///
    /// Spawns one evaluation loop per monitor plus the supervisor loop,
    /// which polls, aggregates, and publishes at the supervisory rate.
    /// Returns a handle whose [`stop`](WatchdogHandle::stop) cooperatively
    /// terminates every loop; each loop observes the shutdown signal at
    /// least once per tick.
    pub fn start(&self) -> WatchdogHandle {
        let (stop_tx, stop_rx) = watch::channel(false);

        info!("Monitoring {} streams", self.monitors.len());
        for monitor in &self.monitors {
            debug!(
                stream = %monitor.name(),
                source = %monitor.source(),
                min_interval_ms = monitor.min_interval().as_millis() as u64,
                eval_period_ms = monitor.eval_period().as_millis() as u64,
                "starting stream monitor"
            );
            monitor.clone().spawn_eval_loop(stop_rx.clone());
        }

        let watchdog = self.clone();
        let mut stop_rx = stop_rx;
        // The supervisor task holds a sender of its own so that dropping
        // the handle detaches the loops instead of closing the channel.
        let keepalive = stop_tx.clone();
        tokio::spawn(async move {
            let _keepalive = keepalive;
            let mut ticker = tokio::time::interval(watchdog.period);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        watchdog.emit_now().await;
                    }
                    res = stop_rx.changed() => {
                        if res.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("supervisor loop stopped");
        });

        WatchdogHandle { stop_tx }
    }
}

/// Builder for configuring a [`Watchdog`].
#[derive(Debug, Default)]
pub struct WatchdogBuilder {
    streams: Vec<StreamConfig>,
    outputs: Vec<Output>,
    rate: Option<f64>,
}

impl WatchdogBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the supervisory rate in Hz. Defaults to 10 Hz.
    pub fn rate(mut self, hz: f64) -> Self {
        self.rate = Some(hz);
        self
    }

    /// Add a monitored stream.
    pub fn stream(mut self, config: StreamConfig) -> Self {
        self.streams.push(config);
        self
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; reports are published to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Build the watchdog, constructing one monitor per stream.
    pub fn build(self) -> Result<Watchdog, WatchdogError> {
        let rate = self.rate.unwrap_or(10.0);
        let config = WatchdogConfig {
            rate,
            streams: self.streams,
        };
        config.validate()?;

        let monitors = config
            .streams
            .iter()
            .map(|s| StreamMonitor::new(s).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Watchdog {
            monitors,
            outputs: Arc::new(self.outputs),
            period: Duration::from_secs_f64(1.0 / rate),
            // Fail-safe until the first poll.
            aggregate: Arc::new(AtomicBool::new(false)),
        })
    }
}

/// Handle for stopping the watchdog's background loops.
///
/// Drop this handle to leave the loops running for the process lifetime,
/// or call `stop()` for a cooperative shutdown.
#[derive(Debug)]
pub struct WatchdogHandle {
    stop_tx: watch::Sender<bool>,
}

impl WatchdogHandle {
    /// Request cooperative shutdown of all monitor and supervisor loops.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }
}
