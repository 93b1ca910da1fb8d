//! Fetching sources and turning them into `rodio` sinks.
//!
//! Sources are read fully into memory so the decoder gets a seekable reader
//! regardless of where the audio came from.

use std::fs::File;
use std::io::{self, Cursor, Read};
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::engine::EngineError;
use super::types::MediaSource;

/// Read size between cancellation checks.
const CHUNK: usize = 64 * 1024;

/// Read the whole source into memory.
///
/// `cancelled` is asked between chunks; `Ok(None)` means the load was abandoned.
pub(super) fn load_bytes(
    client: &Client,
    source: &MediaSource,
    cancelled: &mut dyn FnMut() -> bool,
) -> Result<Option<Vec<u8>>, EngineError> {
    match source {
        MediaSource::File(path) => {
            let file = File::open(path)
                .map_err(|e| EngineError::Load(format!("{}: {e}", path.display())))?;
            read_cancellable(file, cancelled)
                .map_err(|e| EngineError::Load(format!("{}: {e}", path.display())))
        }
        MediaSource::Url(url) => {
            let resp = client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|e| EngineError::Load(e.to_string()))?;
            read_cancellable(resp, cancelled).map_err(|e| EngineError::Load(e.to_string()))
        }
    }
}

pub(super) fn read_cancellable<R: Read>(
    mut reader: R,
    cancelled: &mut dyn FnMut() -> bool,
) -> io::Result<Option<Vec<u8>>> {
    let mut bytes = Vec::new();
    let mut chunk = vec![0; CHUNK];
    loop {
        if cancelled() {
            return Ok(None);
        }
        match reader.read(&mut chunk) {
            Ok(0) => return Ok(Some(bytes)),
            Ok(n) => bytes.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Create a paused `Sink` for `bytes` that starts playback at `start_at`.
///
/// Also returns the decoder's total duration, when it can tell.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    bytes: Vec<u8>,
    start_at: Duration,
) -> Result<(Sink, Option<Duration>), EngineError> {
    let decoder = Decoder::new(Cursor::new(bytes)).map_err(|e| EngineError::Load(e.to_string()))?;
    let total = decoder.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    // `skip_duration` is the fallback seeking primitive; Duration::ZERO is fine.
    sink.append(decoder.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}

/// Ramp `sink` from `from` down to silence over `fade_out_ms`.
pub(super) fn fade_out_sink(sink: &Sink, from: f32, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(from * (1.0 - t));
        std::thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
