//! # pulsewatch
//!
//! A liveness watchdog for periodic data streams.
//!
//! Each monitored stream is expected to deliver messages at or above a
//! configured minimum rate. The watchdog observes arrival timestamps only -
//! payloads are never inspected - and derives a boolean health verdict per
//! stream. A supervisor ANDs all verdicts into one aggregate status and a
//! [`CommandGate`] uses that aggregate to forward or zero an unrelated
//! command stream, fail-stopping actuation whenever any monitored stream
//! goes quiet.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pulsewatch::{Output, StreamConfig, Watchdog};
//! use pulsewatch_types::VelocityCommand;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pulsewatch::WatchdogError> {
//!     let watchdog = Watchdog::builder()
//!         .rate(10.0)
//!         .stream(StreamConfig {
//!             name: "lidar".into(),
//!             source: "scan".into(),
//!             min_freq: 10.0,
//!             use_average: false,
//!             eval_rate: 10.0,
//!         })
//!         .output(Output::file("status.json"))
//!         .build()?;
//!
//!     // Producer side: one recorder per stream, driven by the transport.
//!     let recorder = watchdog.recorder("scan").unwrap();
//!
//!     // Gate side: relay or zero velocity commands.
//!     let gate = watchdog.gate::<VelocityCommand>();
//!
//!     // Start background evaluation and publication (non-blocking).
//!     let handle = watchdog.start();
//!
//!     recorder.record(); // once per inbound message
//!     let _out = gate.apply(VelocityCommand::zero()); // once per command
//!
//!     handle.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **[`StreamMonitor`]**: one per stream. Buffers arrival instants behind
//!   a mutex, evaluates inter-arrival gaps on its own periodic task, and
//!   exposes a lock-free verdict. Strict mode fails on any single oversized
//!   gap; windowed-average mode fails on an oversized mean gap.
//! - **[`Watchdog`]**: polls every monitor at the supervisory rate, ANDs
//!   the verdicts, publishes a [`StatusReport`] to the configured
//!   [`Output`]s, and shares the aggregate with gates.
//! - **[`CommandGate`]**: event-driven relay reading the last-known
//!   aggregate; staleness is bounded by one supervisory period.
//!
//! All loops are tokio tasks driven by their own timers and shut down
//! cooperatively through a shared watch channel.

mod config;
mod error;
mod gate;
mod monitor;
mod output;
mod recorder;
mod state;
mod supervisor;

pub use config::{StreamConfig, WatchdogConfig};
pub use error::WatchdogError;
pub use gate::{CommandGate, Neutral};
pub use monitor::StreamMonitor;
pub use output::Output;
pub use recorder::ArrivalRecorder;
pub use supervisor::{Watchdog, WatchdogBuilder, WatchdogHandle};

// Re-export types for convenience
pub use pulsewatch_types::{SchemaVersion, StatusReport, StreamStatus, VelocityCommand};
