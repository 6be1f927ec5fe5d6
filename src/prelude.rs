//! Commonly used types and utilities for ease of import.

pub use crate::{
    coord_label, parse_coord_label, Cell, FireOutcome, GameEngine, Grid, MatchOutcome, Role,
    SessionConfig, SideId, Tally, TurnState,
};

pub use crate::link::{LinkAttachment, LinkEvent, PeerLink};
pub use crate::presenter::{ChannelPresenter, ConnectionEvent, Presenter, UiEvent};
pub use crate::protocol::{Message, Shot};
pub use crate::session::{MatchSnapshot, Session, SessionHandle};
pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
