//! Callback surface between the session and whatever draws the game.

use tokio::sync::mpsc::UnboundedSender;

use crate::common::SideId;
use crate::grid::Grid;
use crate::turn::TurnState;

/// Connection lifecycle notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Listening { address: String, port: u16 },
    Connected { peer: Option<String> },
    /// Link is gone. `during_match` is set when a running match was aborted.
    Disconnected { reason: String, during_match: bool },
    /// Bind, accept or connect failed; nothing was retried.
    Failed(String),
}

/// Everything the session tells the presentation layer. Implementations
/// must not block: calls happen on the session task.
pub trait Presenter: Send + 'static {
    fn on_chat_line(&mut self, text: &str);
    fn on_grid_changed(&mut self, side: SideId, grid: &Grid);
    fn on_turn_changed(&mut self, turn: TurnState);
    fn on_time_remaining(&mut self, seconds: u32);
    /// `None` when the match ended without a winner (aborted).
    fn on_game_over(&mut self, winner: Option<SideId>);
    fn on_connection_status(&mut self, event: ConnectionEvent);
}

/// Owned copy of a presenter callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Chat(String),
    GridChanged(SideId, Grid),
    TurnChanged(TurnState),
    TimeRemaining(u32),
    GameOver(Option<SideId>),
    Connection(ConnectionEvent),
}

/// Forwards every callback into a channel, for frontends that run their
/// own loop and for tests.
pub struct ChannelPresenter {
    tx: UnboundedSender<UiEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    fn push(&self, event: UiEvent) {
        // receiver gone means nobody is watching
        let _ = self.tx.send(event);
    }
}

impl Presenter for ChannelPresenter {
    fn on_chat_line(&mut self, text: &str) {
        self.push(UiEvent::Chat(text.to_string()));
    }

    fn on_grid_changed(&mut self, side: SideId, grid: &Grid) {
        self.push(UiEvent::GridChanged(side, *grid));
    }

    fn on_turn_changed(&mut self, turn: TurnState) {
        self.push(UiEvent::TurnChanged(turn));
    }

    fn on_time_remaining(&mut self, seconds: u32) {
        self.push(UiEvent::TimeRemaining(seconds));
    }

    fn on_game_over(&mut self, winner: Option<SideId>) {
        self.push(UiEvent::GameOver(winner));
    }

    fn on_connection_status(&mut self, event: ConnectionEvent) {
        self.push(UiEvent::Connection(event));
    }
}

/// Presenter that drops everything.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_chat_line(&mut self, _text: &str) {}
    fn on_grid_changed(&mut self, _side: SideId, _grid: &Grid) {}
    fn on_turn_changed(&mut self, _turn: TurnState) {}
    fn on_time_remaining(&mut self, _seconds: u32) {}
    fn on_game_over(&mut self, _winner: Option<SideId>) {}
    fn on_connection_status(&mut self, _event: ConnectionEvent) {}
}
