use thiserror::Error;

/// A parsed prompt line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Bare number: pick the n-th (1-based) entry of the last list shown.
    Select(usize),
    /// Anything that is neither a command nor a number.
    Text(String),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Play(String),
    QueueAdd(String),
    Volume(i64),
    QueuePlay(usize),
    SkipForward(Option<u64>),
    SkipBackward(Option<u64>),
    AddToPlaylist { playlist: String, query: String },
    ViewPlaylist(String),
    Album(String),
    Pause,
    Resume,
    Stop,
    ShowQueue,
    ClearQueue,
    Next,
    Prev,
    Recents,
    ShowPlaylists,
    PlayPlaylist,
    Library,
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid command. You can see the list of commands using /help")]
    Invalid,
    #[error("{0} expects a number")]
    NotANumber(&'static str),
}

fn required(arg: Option<&str>) -> Result<String, ParseError> {
    arg.map(str::to_string).ok_or(ParseError::Invalid)
}

fn number<T: std::str::FromStr>(arg: Option<&str>, name: &'static str) -> Result<T, ParseError> {
    arg.ok_or(ParseError::Invalid)?
        .parse()
        .map_err(|_| ParseError::NotANumber(name))
}

fn optional_number(arg: Option<&str>, name: &'static str) -> Result<Option<u64>, ParseError> {
    arg.map(|a| a.parse().map_err(|_| ParseError::NotANumber(name)))
        .transpose()
}

/// Parse one line typed at the prompt.
pub fn parse(line: &str) -> Result<Input, ParseError> {
    let line = line.trim();

    let Some(rest) = line.strip_prefix('/') else {
        if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
            return line
                .parse()
                .map(Input::Select)
                .map_err(|_| ParseError::NotANumber("selection"));
        }
        return Ok(Input::Text(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    let cmd = match name {
        "play" | "pl" => Command::Play(required(arg)?),
        "queue-add" | "qa" => Command::QueueAdd(required(arg)?),
        "volume" | "vl" => Command::Volume(number(arg, "/volume")?),
        "qp" => Command::QueuePlay(number(arg, "/qp")?),
        "sf" => Command::SkipForward(optional_number(arg, "/sf")?),
        "sb" => Command::SkipBackward(optional_number(arg, "/sb")?),
        "ap" => {
            let arg = arg.ok_or(ParseError::Invalid)?;
            let (playlist, query) = arg
                .split_once(char::is_whitespace)
                .ok_or(ParseError::Invalid)?;
            let query = query.trim();
            if query.is_empty() {
                return Err(ParseError::Invalid);
            }
            Command::AddToPlaylist {
                playlist: playlist.to_string(),
                query: query.to_string(),
            }
        }
        "vp" => Command::ViewPlaylist(required(arg)?),
        "alb" => Command::Album(required(arg)?),
        "pause" | "ps" => Command::Pause,
        "resume" | "r" => Command::Resume,
        "stop" => Command::Stop,
        "show-queue" | "sq" => Command::ShowQueue,
        "clq" => Command::ClearQueue,
        "next" => Command::Next,
        "prev" => Command::Prev,
        "recents" => Command::Recents,
        "show-playlists" | "sp" => Command::ShowPlaylists,
        "pt" => Command::PlayPlaylist,
        "library" | "lib" => Command::Library,
        "help" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => return Err(ParseError::Invalid),
    };

    Ok(Input::Command(cmd))
}
