use super::event_loop::control_command;
use crate::app::PlaybackState;
use crate::command::Command;
use crate::mpris::ControlCmd;

#[test]
fn media_keys_map_to_prompt_commands() {
    let cases = [
        (ControlCmd::Play, PlaybackState::Paused, Command::Resume),
        (ControlCmd::Pause, PlaybackState::Playing, Command::Pause),
        (ControlCmd::PlayPause, PlaybackState::Playing, Command::Pause),
        (ControlCmd::PlayPause, PlaybackState::Paused, Command::Resume),
        (ControlCmd::Stop, PlaybackState::Playing, Command::Stop),
        (ControlCmd::Next, PlaybackState::Stopped, Command::Next),
        (ControlCmd::Prev, PlaybackState::Stopped, Command::Prev),
        (ControlCmd::Quit, PlaybackState::Playing, Command::Quit),
    ];
    for (cmd, playback, want) in cases {
        assert_eq!(control_command(cmd.clone(), playback), want, "{cmd:?}");
    }
}
