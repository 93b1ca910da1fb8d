//! Command-line parsing for the interactive prompt.
//!
//! Lines starting with `/` are commands (`/play hello`, `/volume 40`);
//! anything else is positional input, either a numeric selection from the
//! last list shown or plain text.

mod parse;

pub use parse::{Command, Input, ParseError, parse};

/// Commands and what they do, in the order `/help` shows them.
pub const HELP: &[(&str, &str)] = &[
    ("/play <track name> or /pl", "search and pick a track to play"),
    ("/pause or /ps", "pause the player"),
    ("/resume or /r", "resume the player"),
    ("/stop", "stop playback"),
    ("/volume <0-100> or /vl", "set the volume"),
    ("/sf [seconds]", "skip forward"),
    ("/sb [seconds]", "skip backward"),
    ("/next", "play the next track in the queue"),
    ("/prev", "play the previous track"),
    ("/queue-add <track name> or /qa", "search and pick a track to queue"),
    ("/show-queue or /sq", "show the queue"),
    ("/qp <position>", "play the queued track at that position"),
    ("/clq", "clear the queue"),
    ("/recents", "show recently played tracks"),
    ("/show-playlists or /sp", "list your playlists"),
    ("/pt", "pick a playlist to play"),
    ("/ap <playlist> <track name>", "search and add a track to a playlist"),
    ("/vp <playlist>", "show a playlist"),
    ("/alb <album name>", "play an album"),
    ("/library or /lib", "browse the local music folder"),
    ("/help", "show this list"),
    ("/quit or /q", "quit"),
];
