use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use pulsewatch::{ArrivalRecorder, CommandGate, Output, Watchdog, WatchdogConfig};
use pulsewatch_types::VelocityCommand;

#[derive(Parser, Debug)]
#[command(name = "pulsewatch")]
#[command(about = "Liveness watchdog for periodic data streams")]
struct Args {
    /// Path to the watchdog config file
    #[arg(short, long, default_value = "watchdog.json")]
    config: PathBuf,

    /// Address to listen on for newline-delimited JSON arrival/command events
    #[arg(short, long, default_value = "127.0.0.1:7171")]
    listen: String,

    /// Write each status report to this JSON file (overwritten per tick)
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Forward status reports to a TCP endpoint as newline-delimited JSON
    #[arg(long)]
    status_tcp: Option<String>,

    /// Print each status report to stdout as newline-delimited JSON
    #[arg(long)]
    stdout: bool,
}

/// Events accepted on the ingest socket, one JSON object per line.
///
/// Arrival events drive the stream monitors; command events are answered
/// with the gated command on the same connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundEvent {
    Arrival { source: String },
    Command { command: VelocityCommand },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Fail fast: a missing file or missing field aborts startup here.
    let config = WatchdogConfig::load(&args.config)
        .with_context(|| format!("loading watchdog config from {}", args.config.display()))?;

    let mut builder = Watchdog::builder().rate(config.rate);
    for stream in &config.streams {
        info!(
            name = %stream.name,
            source = %stream.source,
            min_freq = stream.min_freq,
            use_average = stream.use_average,
            "configured stream"
        );
        builder = builder.stream(stream.clone());
    }

    if let Some(path) = &args.status_file {
        builder = builder.output(Output::file(path));
    }
    if let Some(addr) = &args.status_tcp {
        builder = builder.output(Output::tcp(addr));
    }
    if args.stdout || (args.status_file.is_none() && args.status_tcp.is_none()) {
        builder = builder.output(Output::Stdout);
    }

    let watchdog = builder.build()?;

    // Route inbound arrivals by source id.
    let recorders: Arc<HashMap<String, ArrivalRecorder>> = Arc::new(
        watchdog
            .monitors()
            .iter()
            .map(|m| (m.source().to_string(), m.recorder()))
            .collect(),
    );
    let gate: CommandGate<VelocityCommand> = watchdog.gate();

    let handle = watchdog.start();

    let listener = TcpListener::bind(&args.listen)
        .await
        .with_context(|| format!("binding ingest listener on {}", args.listen))?;
    info!("listening for events on {}", args.listen);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "transport connected");
                        tokio::spawn(handle_connection(stream, recorders.clone(), gate.clone()));
                    }
                    Err(e) => warn!("accept failed: {}", e),
                }
            }
        }
    }

    handle.stop();
    Ok(())
}

/// Serve one transport connection: record arrivals, answer commands with
/// their gated counterpart. Malformed lines are logged and dropped.
async fn handle_connection(
    stream: TcpStream,
    recorders: Arc<HashMap<String, ArrivalRecorder>>,
    gate: CommandGate<VelocityCommand>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<InboundEvent>(line) {
                    Ok(InboundEvent::Arrival { source }) => match recorders.get(&source) {
                        Some(recorder) => recorder.record(),
                        None => debug!(%source, "arrival for unmonitored source"),
                    },
                    Ok(InboundEvent::Command { command }) => {
                        let gated = gate.apply(command);
                        match serde_json::to_string(&gated) {
                            Ok(mut json) => {
                                json.push('\n');
                                if writer.write_all(json.as_bytes()).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("failed to serialize gated command: {}", e),
                        }
                    }
                    Err(e) => warn!("dropping malformed event line: {}", e),
                }
            }
            Ok(None) => break, // EOF
            Err(e) => {
                warn!("transport read error: {}", e);
                break;
            }
        }
    }
}
