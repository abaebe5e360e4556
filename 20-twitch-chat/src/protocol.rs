//! Twitch IRC vocabulary: outbound commands, inbound decoding, and chat
//! message extraction.

use std::{borrow::Cow, fmt, fmt::Write as _, sync::LazyLock};

use chrono::{NaiveTime, Timelike};
use clap::ValueEnum;
use regex::Regex;

pub const HOST: &str = "irc.chat.twitch.tv";
pub const PORT: u16 = 6697;

/// Outbound chat message template. Prefer [`Command::Privmsg`], which renders
/// the same line.
pub const PRIVMSG: &str = "PRIVMSG #{channel} :{msg}\r\n";

pub const LINE_ENDING: &str = "\r\n";

static CHAT_MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:([^!]+).* PRIVMSG #[^ ]+ :([^\r]+)").expect("chat message pattern is valid")
});

/// A client command. `Display` renders the line without its terminator;
/// [`crate::session::Session::send_line`] appends it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Pass { token: &'a str },
    Nick { username: &'a str },
    Join { channel: &'a str },
    Privmsg { channel: &'a str, text: &'a str },
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass { token } => write!(f, "PASS {token}"),
            Command::Nick { username } => write!(f, "NICK {username}"),
            Command::Join { channel } => write!(f, "JOIN #{channel}"),
            Command::Privmsg { channel, text } => write!(f, "PRIVMSG #{channel} :{text}"),
        }
    }
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass { .. } => f.write_str("PASS ***"),
            other => write!(f, "{other}"),
        }
    }
}

/// Decodes a frame as UTF-8 without ever failing.
///
/// Each byte outside a valid sequence is written as `\xNN` (lowercase hex),
/// so malformed input stays visible and stable instead of collapsing into
/// replacement characters.
pub fn decode_line(frame: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(frame) {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(frame.len() + 8);
    for chunk in frame.utf8_chunks() {
        decoded.push_str(chunk.valid());
        for byte in chunk.invalid() {
            // Writing into a String cannot fail.
            let _ = write!(decoded, "\\x{byte:02x}");
        }
    }
    Cow::Owned(decoded)
}

/// A chat message sent to the joined channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub sender: String,
    pub body: String,
}

impl ChatEvent {
    /// Extracts a chat message from a decoded line. Pings, numerics, joins
    /// and every other control line yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let captures = CHAT_MESSAGE.captures(line)?;
        Some(Self {
            sender: captures[1].to_string(),
            body: captures[2].to_string(),
        })
    }

    /// Renders `[HH:MM]<sender> body`.
    pub fn format_at(&self, time: NaiveTime) -> String {
        format!(
            "[{:02}:{:02}]<{}> {}",
            time.hour(),
            time.minute(),
            self.sender,
            self.body
        )
    }
}

/// How inbound lines reach standard output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Print only chat messages, timestamped.
    #[default]
    Chat,
    /// Print every decoded line as received.
    Raw,
}

impl OutputMode {
    /// Returns the output line for `line`, or `None` when it is filtered out.
    pub fn render(self, line: &str, now: NaiveTime) -> Option<String> {
        match self {
            OutputMode::Chat => ChatEvent::parse(line).map(|event| event.format_at(now)),
            OutputMode::Raw => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}
