//! Restart negotiation between the two sides.

use crate::protocol::RestartSignal;

/// Who has asked for a restart in the current match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartVote {
    #[default]
    NoRequest,
    RequestedByLocal,
    RequestedByRemote,
}

/// What the session must do after a handshake transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartAction {
    /// Send `RESTART::0` and wait for the peer.
    SendRequest,
    /// Send `RESTART::1` and reset the match.
    AgreeAndReset,
    /// Peer agreed to our request: reset the match.
    Reset,
    /// Peer asked; tell the local user and wait for their consent.
    AwaitLocalConsent,
    /// Duplicate or stale signal.
    Ignore,
}

/// Tri-state handshake. Both sides asking, in either order, resolves to one
/// reset per side; a single request never resets anything on its own.
#[derive(Debug, Clone, Default)]
pub struct RestartHandshake {
    vote: RestartVote,
}

impl RestartHandshake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vote(&self) -> RestartVote {
        self.vote
    }

    /// The local user asked for a restart (or agreed to the peer's).
    pub fn request_local(&mut self) -> RestartAction {
        match self.vote {
            RestartVote::NoRequest => {
                self.vote = RestartVote::RequestedByLocal;
                RestartAction::SendRequest
            }
            RestartVote::RequestedByRemote => {
                self.vote = RestartVote::NoRequest;
                RestartAction::AgreeAndReset
            }
            RestartVote::RequestedByLocal => RestartAction::Ignore,
        }
    }

    pub fn on_remote(&mut self, signal: RestartSignal) -> RestartAction {
        match (signal, self.vote) {
            (RestartSignal::Request, RestartVote::NoRequest) => {
                self.vote = RestartVote::RequestedByRemote;
                RestartAction::AwaitLocalConsent
            }
            // requests crossed on the wire
            (RestartSignal::Request, RestartVote::RequestedByLocal) => {
                self.vote = RestartVote::NoRequest;
                RestartAction::AgreeAndReset
            }
            (RestartSignal::Request, RestartVote::RequestedByRemote) => RestartAction::Ignore,
            (RestartSignal::Agree, RestartVote::RequestedByLocal) => {
                self.vote = RestartVote::NoRequest;
                RestartAction::Reset
            }
            (RestartSignal::Agree, _) => RestartAction::Ignore,
        }
    }

    pub fn clear(&mut self) {
        self.vote = RestartVote::NoRequest;
    }
}
