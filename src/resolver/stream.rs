//! Stream URL extraction by shelling out to `yt-dlp`.

use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

use super::types::{ResolveError, ResolvedStream};

#[derive(Debug, Deserialize)]
struct Dump {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    title: Option<String>,
    /// Present when the extractor answers with a search playlist.
    #[serde(default)]
    entries: Option<Vec<Dump>>,
}

/// Parse `yt-dlp --dump-json` output into a stream.
///
/// Accepts either a single video object or a playlist whose first entry is the
/// hit. Only the first non-empty line is considered.
pub fn parse_dump(output: &str) -> Result<ResolvedStream, ResolveError> {
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ResolveError::NotFound("extractor returned nothing".to_string()))?;

    let mut dump: Dump =
        serde_json::from_str(line).map_err(|e| ResolveError::Decode(e.to_string()))?;
    if dump.url.is_none() {
        if let Some(first) = dump.entries.take().and_then(|e| e.into_iter().next()) {
            dump = first;
        }
    }

    let url = dump
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ResolveError::NotFound("no stream url in extractor output".to_string()))?;

    let duration = dump
        .duration
        .filter(|d| *d > 0.0)
        .and_then(|d| Duration::try_from_secs_f64(d).ok());

    Ok(ResolvedStream {
        url,
        duration,
        title: dump.title,
    })
}

/// Prefer m4a: the decoder has no Opus support, so webm/opus is a last resort.
const FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// How often a running extractor is checked for exit.
const WAIT_STEP: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    timeout: Duration,
}

impl YtDlp {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Best audio stream of the top search hit for `query`.
    ///
    /// The extractor is killed once it runs past the timeout, so one hung
    /// lookup cannot hold up the requests queued behind it.
    pub fn resolve(&self, query: &str) -> Result<ResolvedStream, ResolveError> {
        debug!(program = %self.program, %query, "resolving stream");
        let mut child = Command::new(&self.program)
            .args([
                "--dump-json",
                "--no-playlist",
                "--no-warnings",
                "--quiet",
                "-f",
                FORMAT,
            ])
            .arg(format!("ytsearch1:{query}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    ResolveError::Unavailable(format!("{} is not installed", self.program))
                }
                _ => ResolveError::Transient(e.to_string()),
            })?;

        // Read both pipes concurrently; a full pipe would stall the child.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(%query, timeout = ?self.timeout, "extractor timed out");
                    return Err(ResolveError::Transient(format!(
                        "{} timed out after {:?}",
                        self.program, self.timeout
                    )));
                }
                Ok(None) => thread::sleep(WAIT_STEP),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ResolveError::Transient(e.to_string()));
                }
            }
        };

        let stdout = collect(stdout);
        if !status.success() {
            let stderr = String::from_utf8_lossy(&collect(stderr)).into_owned();
            let reason = stderr.lines().last().unwrap_or("").trim().to_string();
            warn!(status = ?status.code(), %reason, "extractor failed");
            return Err(ResolveError::Transient(if reason.is_empty() {
                format!("{} exited with {}", self.program, status)
            } else {
                reason
            }));
        }

        parse_dump(&String::from_utf8_lossy(&stdout))
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}
