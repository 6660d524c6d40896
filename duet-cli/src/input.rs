/// One line typed at the room prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Chat(String),
    Call,
    HangUp,
    Mic,
    Cam,
    Who,
    Leave,
    Help,
    Unknown(String),
    Empty,
}

pub const HELP: &str = "\
/call    start a call with the other participant
/hangup  end the current call
/mic     toggle the microphone
/cam     toggle the camera
/who     list participants
/leave   leave the room and quit
anything else is sent as a chat message";

pub fn parse_line(line: &str) -> ShellInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ShellInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return ShellInput::Chat(trimmed.to_owned());
    };
    // "//text" sends "/text" as chat.
    if command.starts_with('/') {
        return ShellInput::Chat(command.to_owned());
    }
    match command.split_whitespace().next().unwrap_or_default() {
        "call" => ShellInput::Call,
        "hangup" => ShellInput::HangUp,
        "mic" => ShellInput::Mic,
        "cam" => ShellInput::Cam,
        "who" => ShellInput::Who,
        "leave" | "quit" => ShellInput::Leave,
        "help" => ShellInput::Help,
        other => ShellInput::Unknown(other.to_owned()),
    }
}
