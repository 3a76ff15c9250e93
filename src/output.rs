//! Output backends for publishing status reports.

use std::path::PathBuf;

use pulsewatch_types::StatusReport;

/// Output destination for status reports.
///
/// Configure where the supervisor loop should publish each report.
#[derive(Debug)]
pub enum Output {
    /// Write each report to a JSON file.
    ///
    /// The file is overwritten with each report.
    File(PathBuf),

    /// Send reports to a TCP server as newline-delimited JSON.
    ///
    /// Connection is per-report and best effort; an unreachable server
    /// never blocks the supervisor.
    Tcp(String),

    /// Send reports through a channel.
    ///
    /// Use `Output::channel()` to create this variant and get the receiver.
    Channel(tokio::sync::mpsc::Sender<StatusReport>),

    /// Print each report to stdout as newline-delimited JSON.
    Stdout,
}

impl Output {
    /// Create a file output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pulsewatch::Output;
    ///
    /// let output = Output::file("status.json");
    /// ```
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Output::File(path.into())
    }

    /// Create a TCP output.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pulsewatch::Output;
    ///
    /// let output = Output::tcp("localhost:9090");
    /// ```
    pub fn tcp(addr: impl Into<String>) -> Self {
        Output::Tcp(addr.into())
    }

    /// Create a channel output and return both the output and receiver.
    ///
    /// This is useful for consuming reports in-process, e.g. to feed
    /// another task or a test.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pulsewatch::Output;
    /// use pulsewatch_types::StatusReport;
    ///
    /// # tokio_test::block_on(async {
    /// let (output, mut rx) = Output::channel(16);
    ///
    /// let report = StatusReport::builder().stream("lidar", true).build();
    /// output.emit(&report).await.unwrap();
    ///
    /// assert!(rx.recv().await.unwrap().healthy);
    /// # });
    /// ```
    pub fn channel(buffer: usize) -> (Self, tokio::sync::mpsc::Receiver<StatusReport>) {
        let (tx, rx) = tokio::sync::mpsc::channel(buffer);
        (Output::Channel(tx), rx)
    }

    /// Emit a report to this output.
    pub async fn emit(&self, report: &StatusReport) -> std::io::Result<()> {
        match self {
            Output::File(path) => {
                let json = serde_json::to_string_pretty(report)?;
                tokio::fs::write(path, json).await?;
            }
            Output::Tcp(addr) => {
                use tokio::io::AsyncWriteExt;
                use tokio::net::TcpStream;

                // Try to connect and send (best effort)
                if let Ok(mut stream) = TcpStream::connect(addr).await {
                    let json = serde_json::to_string(report)?;
                    let _ = stream.write_all(json.as_bytes()).await;
                    let _ = stream.write_all(b"\n").await;
                }
            }
            Output::Channel(tx) => {
                // Best effort send (don't block if channel is full)
                let _ = tx.try_send(report.clone());
            }
            Output::Stdout => {
                let json = serde_json::to_string(report)?;
                println!("{}", json);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> StatusReport {
        StatusReport::builder()
            .timestamp_ms(1703160000000)
            .stream("lidar", true)
            .stream("imu", false)
            .build()
    }

    #[tokio::test]
    async fn file_output_writes_parseable_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");

        let output = Output::file(&path);
        output.emit(&sample_report()).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: StatusReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, sample_report());
    }

    #[tokio::test]
    async fn file_output_overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status.json");
        let output = Output::file(&path);

        output.emit(&sample_report()).await.unwrap();
        let healthy = StatusReport::builder().stream("lidar", true).build();
        output.emit(&healthy).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: StatusReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert!(parsed.healthy);
    }

    #[tokio::test]
    async fn channel_output_delivers_report() {
        let (output, mut rx) = Output::channel(4);
        output.emit(&sample_report()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, sample_report());
    }

    #[tokio::test]
    async fn full_channel_does_not_block() {
        let (output, _rx) = Output::channel(1);
        output.emit(&sample_report()).await.unwrap();
        // Buffer is full now; the second emit must drop rather than block.
        output.emit(&sample_report()).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_tcp_is_best_effort() {
        // Port 1 is essentially never listening.
        let output = Output::tcp("127.0.0.1:1");
        output.emit(&sample_report()).await.unwrap();
    }
}
