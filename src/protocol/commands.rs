//! Module `commands`
//!
//! Parsing of command lines received from depot clients, plus the result
//! types handlers hand back to the session loop.

/// Declared type recorded when an upload names none
pub const UNDECLARED_TYPE: &str = "application/octet-stream";

/// A command parsed from one client line.
///
/// Commands that need arguments carry them; a known command with bad
/// arguments becomes `INVALID` with the reason to report.
#[derive(Debug, PartialEq)]
pub enum Command {
    QUIT,
    LIST,
    PREVIEW(String), // Table preview of a stored file
    UPLOAD {
        name: String,
        length: u64,
        declared_type: String,
    },
    INVALID(String), // Known command, unusable arguments
    UNKNOWN,
}

/// Outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    CloseConnection,
}

/// Status plus the reply text to send, CRLF included.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: Option<String>,
}

/// Parses a raw line into a `Command`. The verb is case-insensitive.
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "QUIT" | "Q" => Command::QUIT,
        "LIST" => Command::LIST,
        "PREVIEW" if !arg.is_empty() => Command::PREVIEW(arg.to_string()),
        "PREVIEW" => Command::INVALID("PREVIEW requires a file name".into()),
        "UPLOAD" => parse_upload(arg),
        _ => Command::UNKNOWN,
    }
}

/// `UPLOAD <name> <length> [declared-type]`; the declared type may contain spaces
fn parse_upload(arg: &str) -> Command {
    let (name, rest) = next_word(arg);
    let (length, rest) = next_word(rest);
    let declared_type = rest.trim();

    if name.is_empty() || length.is_empty() {
        return Command::INVALID("Usage: UPLOAD <name> <length> [type]".into());
    }

    match length.parse::<u64>() {
        Ok(length) => Command::UPLOAD {
            name: name.to_string(),
            length,
            declared_type: if declared_type.is_empty() {
                UNDECLARED_TYPE.to_string()
            } else {
                declared_type.to_string()
            },
        },
        Err(_) => Command::INVALID(format!("Invalid upload length: {}", length)),
    }
}

fn next_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}
