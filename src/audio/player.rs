use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::warn;

use crate::config::AudioSettings;

use super::engine::{EngineError, PlaybackEngine};
use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, EngineState, MediaSource, PlaybackHandle, PlaybackInfo};

/// How long past the fade-out `quit_softly` waits for the audio thread.
const QUIT_GRACE: Duration = Duration::from_secs(1);

/// rodio-backed [`PlaybackEngine`] running on its own thread.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    playback: PlaybackHandle,
    volume: u8,
    /// Last play request handed to the thread.
    generation: u64,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let playback_info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo::default()));

        let audio_handle = spawn_audio_thread(
            rx,
            playback_info.clone(),
            Duration::from_secs(audio_settings.download_timeout_secs.max(1)),
        );

        Self {
            tx,
            playback: playback_info,
            volume: audio_settings.default_volume.min(100),
            generation: 0,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    fn send(&self, cmd: AudioCmd) -> Result<(), EngineError> {
        self.tx.send(cmd).map_err(|_| EngineError::Disconnected)
    }

    fn info(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|i| i.clone())
            .unwrap_or_default()
    }

    fn gain(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        let Some(handle) = self.join.lock().ok().and_then(|mut j| j.take()) else {
            return;
        };
        // A thread stuck in a download is left behind rather than waited on.
        let deadline = Instant::now() + fade_out + QUIT_GRACE;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("audio thread did not stop in time");
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        let _ = handle.join();
    }
}

impl PlaybackEngine for AudioPlayer {
    fn play(&mut self, source: MediaSource) -> Result<(), EngineError> {
        // Mark Opening before sending; the thread only reports back for the
        // newest generation, so older loads cannot overwrite this.
        self.generation += 1;
        let generation = self.generation;
        if let Ok(mut i) = self.playback.lock() {
            i.state = EngineState::Opening;
            i.position = Duration::ZERO;
            i.duration = None;
            i.error = None;
            i.generation = generation;
        }
        let volume = self.gain();
        let cmd = AudioCmd::Play {
            source,
            volume,
            generation,
        };
        self.send(cmd).inspect_err(|e| {
            if let Ok(mut i) = self.playback.lock() {
                i.state = EngineState::Error;
                i.error = Some(e.to_string());
            }
        })
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.send(AudioCmd::Pause)
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.send(AudioCmd::Resume)
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.send(AudioCmd::Stop)
    }

    fn set_volume(&mut self, volume: u8) -> Result<(), EngineError> {
        self.volume = volume.min(100);
        self.send(AudioCmd::SetVolume(self.gain()))
    }

    fn volume(&self) -> u8 {
        self.volume
    }

    fn time(&self) -> Duration {
        self.info().position
    }

    fn set_time(&mut self, position: Duration) -> Result<(), EngineError> {
        self.send(AudioCmd::Seek(position))?;
        if let Ok(mut i) = self.playback.lock() {
            i.position = position;
        }
        Ok(())
    }

    fn state(&self) -> EngineState {
        self.info().state
    }

    fn duration(&self) -> Option<Duration> {
        self.info().duration
    }

    fn last_error(&self) -> Option<String> {
        self.info().error
    }
}
