//! Line-oriented wire protocol.
//!
//! Every message is one UTF-8 line of the form `TYPE::PAYLOAD`. A line
//! without the `::` separator is read as a bare TYPE with an empty payload.
//!
//! | TYPE         | PAYLOAD                               |
//! |--------------|---------------------------------------|
//! | `NAME`       | display name                          |
//! | `PLACE`      | `row,col,length,horizontal`           |
//! | `MOVE`       | `row,col`; `-1,-1` forfeits the turn  |
//! | `CHAT`       | free text                             |
//! | `START`      | `START`, `ACK_START` or `PLACED`      |
//! | `RESTART`    | `0` request, `1` agree                |
//! | `DISCONNECT` | empty                                 |

use core::fmt;

use crate::common::board_index;
use crate::config::BOARD_SIZE;

pub const SEPARATOR: &str = "::";

/// Wire value of a forfeited turn, for both row and column.
pub const FORFEIT_COORD: i32 = -1;

/// The fixed set of message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Name,
    Place,
    Move,
    Chat,
    Start,
    Restart,
    Disconnect,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Name,
        MessageKind::Place,
        MessageKind::Move,
        MessageKind::Chat,
        MessageKind::Start,
        MessageKind::Restart,
        MessageKind::Disconnect,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Name => "NAME",
            MessageKind::Place => "PLACE",
            MessageKind::Move => "MOVE",
            MessageKind::Chat => "CHAT",
            MessageKind::Start => "START",
            MessageKind::Restart => "RESTART",
            MessageKind::Disconnect => "DISCONNECT",
        }
    }

    pub fn parse(s: &str) -> Option<MessageKind> {
        MessageKind::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `START` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartSignal {
    /// Host opens a new match.
    Start,
    /// Client acknowledges the host's `Start`.
    AckStart,
    /// Sender's fleet is fully placed (ready barrier signal).
    Placed,
}

impl StartSignal {
    fn as_str(self) -> &'static str {
        match self {
            StartSignal::Start => "START",
            StartSignal::AckStart => "ACK_START",
            StartSignal::Placed => "PLACED",
        }
    }
}

/// Payload of a `RESTART` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartSignal {
    Request,
    Agree,
}

/// A fired shot as carried by `MOVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    At { row: usize, col: usize },
    /// Turn passed on timeout. Encoded as `-1,-1`.
    Forfeit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Name(String),
    Place {
        row: usize,
        col: usize,
        length: usize,
        horizontal: bool,
    },
    Move(Shot),
    Chat(String),
    Start(StartSignal),
    Restart(RestartSignal),
    Disconnect,
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Name(_) => MessageKind::Name,
            Message::Place { .. } => MessageKind::Place,
            Message::Move(_) => MessageKind::Move,
            Message::Chat(_) => MessageKind::Chat,
            Message::Start(_) => MessageKind::Start,
            Message::Restart(_) => MessageKind::Restart,
            Message::Disconnect => MessageKind::Disconnect,
        }
    }

    /// Wire form without the trailing newline.
    pub fn encode(&self) -> String {
        let payload = match self {
            Message::Name(name) => single_line(name),
            Message::Place {
                row,
                col,
                length,
                horizontal,
            } => format!("{},{},{},{}", row, col, length, horizontal),
            Message::Move(Shot::At { row, col }) => format!("{},{}", row, col),
            Message::Move(Shot::Forfeit) => format!("{},{}", FORFEIT_COORD, FORFEIT_COORD),
            Message::Chat(text) => single_line(text),
            Message::Start(signal) => signal.as_str().to_string(),
            Message::Restart(RestartSignal::Request) => "0".to_string(),
            Message::Restart(RestartSignal::Agree) => "1".to_string(),
            Message::Disconnect => String::new(),
        };
        format!("{}{}{}", self.kind().as_str(), SEPARATOR, payload)
    }

    /// Parse one line (a trailing `\r\n` or `\n` is ignored).
    pub fn decode(line: &str) -> Result<Message, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ProtocolError::Empty);
        }
        let (kind, payload) = line.split_once(SEPARATOR).unwrap_or((line, ""));
        let kind = MessageKind::parse(kind.trim())
            .ok_or_else(|| ProtocolError::UnknownType(kind.to_string()))?;
        let malformed = || ProtocolError::MalformedPayload {
            kind,
            payload: payload.to_string(),
        };
        // bytes that were not UTF-8 on the wire
        if payload.contains(char::REPLACEMENT_CHARACTER) {
            return Err(malformed());
        }

        let msg = match kind {
            MessageKind::Name => Message::Name(payload.to_string()),
            MessageKind::Chat => Message::Chat(payload.to_string()),
            MessageKind::Disconnect => Message::Disconnect,
            MessageKind::Move => {
                let fields = split_fields::<2>(payload).ok_or_else(malformed)?;
                let row: i32 = fields[0].parse().map_err(|_| malformed())?;
                let col: i32 = fields[1].parse().map_err(|_| malformed())?;
                if row == FORFEIT_COORD && col == FORFEIT_COORD {
                    Message::Move(Shot::Forfeit)
                } else {
                    let (row, col) = board_index(row, col).ok_or_else(malformed)?;
                    Message::Move(Shot::At { row, col })
                }
            }
            MessageKind::Place => {
                let fields = split_fields::<4>(payload).ok_or_else(malformed)?;
                let row: i32 = fields[0].parse().map_err(|_| malformed())?;
                let col: i32 = fields[1].parse().map_err(|_| malformed())?;
                let length: usize = fields[2].parse().map_err(|_| malformed())?;
                let horizontal = parse_bool(fields[3]).ok_or_else(malformed)?;
                let (row, col) = board_index(row, col).ok_or_else(malformed)?;
                if length == 0 || length > BOARD_SIZE as usize {
                    return Err(malformed());
                }
                Message::Place {
                    row,
                    col,
                    length,
                    horizontal,
                }
            }
            MessageKind::Start => match payload.trim() {
                "START" => Message::Start(StartSignal::Start),
                "ACK_START" => Message::Start(StartSignal::AckStart),
                "PLACED" => Message::Start(StartSignal::Placed),
                _ => return Err(malformed()),
            },
            MessageKind::Restart => match payload.trim() {
                "0" => Message::Restart(RestartSignal::Request),
                // older peers answer with "2"
                "1" | "2" => Message::Restart(RestartSignal::Agree),
                _ => return Err(malformed()),
            },
        };
        Ok(msg)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn split_fields<const K: usize>(payload: &str) -> Option<[&str; K]> {
    let mut parts = payload.split(',').map(str::trim);
    let mut out = [""; K];
    for slot in out.iter_mut() {
        *slot = parts.next()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Errors produced while decoding a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Blank line.
    Empty,
    /// TYPE is not one of the known message kinds.
    UnknownType(String),
    /// TYPE is known but the payload does not fit it.
    MalformedPayload { kind: MessageKind, payload: String },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty => write!(f, "Empty message line"),
            ProtocolError::UnknownType(t) => write!(f, "Unknown message type '{}'", t),
            ProtocolError::MalformedPayload { kind, payload } => {
                write!(f, "Malformed {} payload '{}'", kind, payload)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}
