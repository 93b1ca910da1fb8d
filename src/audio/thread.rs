use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use reqwest::blocking::Client;
use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use super::engine::EngineError;
use super::sink::{create_sink_at, fade_out_sink, load_bytes};
use super::types::{AudioCmd, EngineState, MediaSource, PlaybackHandle, PlaybackInfo};

/// How often position and end-of-track are checked between commands.
const TICK: Duration = Duration::from_millis(200);

/// The source currently loaded into a sink.
struct Loaded {
    sink: Sink,
    /// Kept for rebuilding the sink when the decoder cannot seek in place.
    bytes: Vec<u8>,
    volume: f32,
    /// Added to `sink.get_pos()` after a rebuild that skipped into the source.
    offset: Duration,
}

impl Loaded {
    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }
}

fn update(info: &PlaybackHandle, f: impl FnOnce(&mut PlaybackInfo)) {
    if let Ok(mut i) = info.lock() {
        f(&mut i);
    }
}

/// Publish `state` unless a newer `Play` is still waiting in the channel
/// (the player marks the info `Opening` as soon as it sends one).
pub(super) fn publish(info: &PlaybackHandle, state: EngineState, position: Option<Duration>) {
    update(info, |i| {
        if i.state == EngineState::Opening {
            return;
        }
        i.state = state;
        if let Some(p) = position {
            i.position = match (state, i.duration) {
                (EngineState::Ended, Some(d)) => d,
                _ => p,
            };
        }
    });
}

/// Apply the outcome of play request `generation`, unless a newer one was made since.
pub(super) fn settle(info: &PlaybackHandle, generation: u64, f: impl FnOnce(&mut PlaybackInfo)) {
    update(info, |i| {
        if i.generation == generation {
            f(i);
        }
    });
}

/// Commands that make an in-flight load pointless.
pub(super) fn supersedes(cmd: &AudioCmd) -> bool {
    matches!(
        cmd,
        AudioCmd::Play { .. } | AudioCmd::Stop | AudioCmd::Quit { .. }
    )
}

/// Move whatever is waiting in `rx` into `pending`. True once a superseding
/// command is queued or the player is gone.
pub(super) fn drain(rx: &Receiver<AudioCmd>, pending: &mut VecDeque<AudioCmd>) -> bool {
    loop {
        match rx.try_recv() {
            Ok(cmd) => pending.push_back(cmd),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => return true,
        }
    }
    pending.iter().any(supersedes)
}

/// Load and start `source`. `Ok(None)` when `cancelled` cut the download short.
fn start(
    stream: Option<&OutputStream>,
    client: Option<&Client>,
    source: &MediaSource,
    volume: f32,
    cancelled: &mut dyn FnMut() -> bool,
) -> Result<Option<(Loaded, Option<Duration>)>, EngineError> {
    let stream = stream.ok_or_else(|| EngineError::Load("no audio output device".to_string()))?;
    let client = client.ok_or_else(|| EngineError::Load("http client unavailable".to_string()))?;

    let Some(bytes) = load_bytes(client, source, cancelled)? else {
        return Ok(None);
    };
    let (sink, total) = create_sink_at(stream, bytes.clone(), Duration::ZERO)?;
    sink.set_volume(volume);
    sink.play();
    Ok(Some((
        Loaded {
            sink,
            bytes,
            volume,
            offset: Duration::ZERO,
        },
        total,
    )))
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
    download_timeout: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut s) => {
                // rodio logs to stderr when OutputStream is dropped, which
                // scribbles over the TUI.
                s.log_on_drop(false);
                Some(s)
            }
            Err(e) => {
                error!(error = %e, "no audio output device");
                None
            }
        };
        let client = match Client::builder().timeout(download_timeout).build() {
            Ok(c) => Some(c),
            Err(e) => {
                error!(error = %e, "failed to build download client");
                None
            }
        };

        let mut loaded: Option<Loaded> = None;
        let mut state = EngineState::Idle;
        // Commands that arrived while a download was running.
        let mut pending: VecDeque<AudioCmd> = VecDeque::new();

        loop {
            let next = match pending.pop_front() {
                Some(cmd) => Ok(cmd),
                None => rx.recv_timeout(TICK),
            };
            match next {
                Ok(cmd) => match cmd {
                    AudioCmd::Play {
                        source,
                        volume,
                        generation,
                    } => {
                        if let Some(old) = loaded.take() {
                            old.sink.stop();
                        }
                        state = EngineState::Opening;
                        settle(&playback_info, generation, |i| {
                            i.state = state;
                            i.position = Duration::ZERO;
                            i.duration = None;
                            i.error = None;
                        });

                        let outcome = start(
                            stream.as_ref(),
                            client.as_ref(),
                            &source,
                            volume,
                            &mut || drain(&rx, &mut pending),
                        );
                        match outcome {
                            Ok(Some((l, total))) => {
                                info!(?source, ?total, "playback started");
                                loaded = Some(l);
                                state = EngineState::Playing;
                                settle(&playback_info, generation, |i| {
                                    i.state = state;
                                    i.duration = total;
                                });
                            }
                            Ok(None) => {
                                debug!(?source, "load abandoned");
                                state = EngineState::Stopped;
                                settle(&playback_info, generation, |i| i.state = state);
                            }
                            Err(e) => {
                                warn!(?source, error = %e, "playback failed");
                                state = EngineState::Error;
                                settle(&playback_info, generation, |i| {
                                    i.state = state;
                                    i.error = Some(e.to_string());
                                });
                            }
                        }
                    }

                    AudioCmd::Pause => {
                        if let (Some(l), EngineState::Playing) = (&loaded, state) {
                            l.sink.pause();
                            state = EngineState::Paused;
                            publish(&playback_info, state, None);
                        }
                    }

                    AudioCmd::Resume => {
                        if let (Some(l), EngineState::Paused) = (&loaded, state) {
                            l.sink.play();
                            state = EngineState::Playing;
                            publish(&playback_info, state, None);
                        }
                    }

                    AudioCmd::Stop => {
                        if let Some(l) = loaded.take() {
                            l.sink.stop();
                        }
                        state = EngineState::Stopped;
                        publish(&playback_info, state, Some(Duration::ZERO));
                    }

                    AudioCmd::SetVolume(v) => {
                        if let Some(l) = loaded.as_mut() {
                            l.volume = v;
                            l.sink.set_volume(v);
                        }
                    }

                    AudioCmd::Seek(pos) => {
                        let Some(l) = loaded.as_mut() else {
                            continue;
                        };
                        if !matches!(state, EngineState::Playing | EngineState::Paused) {
                            continue;
                        }
                        match l.sink.try_seek(pos) {
                            Ok(()) => l.offset = Duration::ZERO,
                            Err(e) => {
                                // Rebuild the sink and skip into the source instead.
                                debug!(error = %e, "in-place seek failed, rebuilding sink");
                                let Some(stream) = stream.as_ref() else {
                                    continue;
                                };
                                match create_sink_at(stream, l.bytes.clone(), pos) {
                                    Ok((sink, _)) => {
                                        l.sink.stop();
                                        sink.set_volume(l.volume);
                                        if state == EngineState::Playing {
                                            sink.play();
                                        }
                                        l.sink = sink;
                                        l.offset = pos;
                                    }
                                    Err(e) => warn!(error = %e, "seek failed"),
                                }
                            }
                        }
                    }

                    AudioCmd::Quit { fade_out_ms } => {
                        if let Some(l) = loaded.take() {
                            if state == EngineState::Playing {
                                fade_out_sink(&l.sink, l.volume, fade_out_ms);
                            }
                            l.sink.stop();
                        }
                        update(&playback_info, |i| i.state = EngineState::Stopped);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(l) = &loaded {
                if state == EngineState::Playing && l.sink.empty() {
                    debug!("source finished");
                    state = EngineState::Ended;
                }
                publish(&playback_info, state, Some(l.position()));
            }
        }
        info!("audio thread stopped");
    })
}
