use std::time::Duration;

use crate::app::PlaybackState;
use crate::audio::PlaybackEngine;
use crate::mpris::MprisHandle;
use crate::session::Session;

/// What MPRIS last saw, so it is only updated on change.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MprisSnapshot {
    track: Option<(String, Option<Duration>)>,
    playback: PlaybackState,
}

impl MprisSnapshot {
    pub fn of<E: PlaybackEngine>(session: &Session<E>) -> Self {
        Self {
            track: session
                .current()
                .map(|c| (c.descriptor.clone(), c.duration)),
            playback: session.playback_state(),
        }
    }
}

/// Push track and playback state to MPRIS when they changed since `last`.
pub fn update_mpris<E: PlaybackEngine>(
    mpris: &MprisHandle,
    session: &Session<E>,
    last: &mut MprisSnapshot,
) {
    let now = MprisSnapshot::of(session);
    if now == *last {
        return;
    }
    if now.track != last.track {
        mpris.set_track(session.current());
    }
    mpris.set_playback(now.playback);
    *last = now;
}
