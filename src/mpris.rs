//! Media-key integration over the D-Bus MPRIS interface.
//!
//! The service runs on its own thread. Method calls become [`ControlCmd`]s
//! for the event loop; properties are served from a snapshot the event loop
//! refreshes through [`MprisHandle`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::app::PlaybackState;
use crate::descriptor;
use crate::session::NowPlaying;

pub const BUS_NAME: &str = "org.mpris.MediaPlayer2.reprise";
const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

#[derive(Debug, Default)]
struct SharedState {
    playback: PlaybackState,
    title: Option<String>,
    artist: Vec<String>,
    length: Option<Duration>,
    /// Bumped whenever the track changes, used for `mpris:trackid`.
    track_no: u64,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    pub fn set_playback(&self, playback: PlaybackState) {
        if let Ok(mut s) = self.state.lock() {
            s.playback = playback;
        }
    }

    /// Mirror the current track, or clear the metadata with `None`.
    pub fn set_track(&self, now: Option<&NowPlaying>) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match now {
            Some(now) => {
                let (title, artist) = match descriptor::split(&now.descriptor) {
                    Some((name, artist)) => (name.to_string(), vec![artist.to_string()]),
                    None => (now.descriptor.clone(), Vec::new()),
                };
                s.title = Some(title);
                s.artist = artist;
                s.length = now.duration;
                s.track_no += 1;
            }
            None => {
                s.title = None;
                s.artist.clear();
                s.length = None;
            }
        }
    }
}

fn forward(tx: &Sender<ControlCmd>, cmd: ControlCmd) {
    if tx.send(cmd).is_err() {
        debug!("MPRIS: event loop is gone, dropping command");
    }
}

fn owned(v: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(v).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {}

    fn quit(&self) {
        forward(&self.tx, ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "reprise"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        forward(&self.tx, ControlCmd::Next);
    }

    fn previous(&self) {
        forward(&self.tx, ControlCmd::Prev);
    }

    fn play(&self) {
        forward(&self.tx, ControlCmd::Play);
    }

    fn pause(&self) {
        forward(&self.tx, ControlCmd::Pause);
    }

    fn play_pause(&self) {
        forward(&self.tx, ControlCmd::PlayPause);
    }

    fn stop(&self) {
        forward(&self.tx, ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let Some(title) = s.title.clone() else {
            if let Some(v) = ObjectPath::try_from(NO_TRACK).ok().and_then(|p| owned(p.into())) {
                map.insert("mpris:trackid".to_string(), v);
            }
            return map;
        };

        let track_id = format!("/org/reprise/track/{}", s.track_no);
        let entries = [
            (
                "mpris:trackid",
                ObjectPath::try_from(track_id.as_str())
                    .ok()
                    .and_then(|p| owned(p.into())),
            ),
            ("xesam:title", owned(Value::from(title))),
            ("xesam:artist", owned(Value::from(s.artist.clone()))),
            (
                "mpris:length",
                s.length
                    .and_then(|d| i64::try_from(d.as_micros()).ok())
                    .and_then(|us| owned(Value::from(us))),
            ),
        ];
        for (key, value) in entries {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        }
        map
    }
}

/// Start the MPRIS service. Failing to reach the session bus only disables
/// media keys.
pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server
                .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                .await
            {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }
            info!(name = BUS_NAME, "MPRIS service registered");

            // Keep the service alive.
            loop {
                Timer::after(Duration::from_secs(3600)).await;
            }
        });
    });

    MprisHandle { state }
}
