/// Database export through `pg_dump`
///
/// The dump is streamed straight from the child's stdout to the response
/// body. Response status is only decided once the first chunk has arrived or
/// the process has exited, so a dump that fails to start (missing binary,
/// bad credentials) still produces a JSON 500. A failure after that point can
/// only cut the stream short.
///
/// The child is spawned with `kill_on_drop`, so a client that disconnects
/// mid-download stops the dump.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, Command};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

/// Error type for exports
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("Failed to start pg_dump: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("pg_dump exited with {0}")]
    Exited(String),

    #[error("Failed to read pg_dump output: {0}")]
    Io(#[from] std::io::Error),
}

/// A running export: download filename plus the dump bytes
pub struct BackupExport {
    pub filename: String,
    pub body: BoxStream<'static, Result<Bytes, BackupError>>,
}

/// `backup-<ISO 8601 timestamp>.sql` with `:` and `.` replaced by `-`
pub fn backup_filename(now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("backup-{}.sql", timestamp)
}

/// Starts `pg_dump_path <database_url>` and waits until it has either
/// produced output or exited
///
/// # Errors
///
/// `Spawn` when the executable cannot be started, `Exited` when it exits
/// unsuccessfully before writing anything, `Io` when stdout cannot be read.
pub async fn start_export(pg_dump_path: &str, database_url: &str) -> Result<BackupExport, BackupError> {
    let filename = backup_filename(Utc::now());

    let mut child = Command::new(pg_dump_path)
        .arg(database_url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(BackupError::Spawn)?;

    debug!(pg_dump_path, pid = ?child.id(), "Export process started");

    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(forward_stderr(stderr));
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| BackupError::Exited("no stdout pipe".to_string()))?;
    let mut chunks = ReaderStream::new(stdout);

    let first = match chunks.next().await {
        Some(chunk) => chunk?,
        None => {
            // Closed stdout without writing: the exit status decides.
            wait_success(&mut child).await?;
            info!(filename = %filename, "Export finished with empty output");
            return Ok(BackupExport {
                filename,
                body: stream::empty().boxed(),
            });
        }
    };

    let rest = chunks.map(|chunk| chunk.map_err(BackupError::Io));
    let exit = stream::once(async move {
        match wait_success(&mut child).await {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "Export failed after streaming began");
                Some(Err(e))
            }
        }
    })
    .filter_map(futures::future::ready);

    info!(filename = %filename, "Export streaming");

    Ok(BackupExport {
        filename,
        body: stream::once(async move { Ok(first) })
            .chain(rest)
            .chain(exit)
            .boxed(),
    })
}

async fn wait_success(child: &mut Child) -> Result<(), BackupError> {
    let status = child.wait().await?;
    if status.success() {
        debug!("Export process exited successfully");
        Ok(())
    } else {
        Err(BackupError::Exited(status.to_string()))
    }
}

async fn forward_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!(target: "pg_dump", "{}", line);
    }
}
