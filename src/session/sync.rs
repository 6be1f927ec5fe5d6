//! Inbound message dispatch plus the start, ready and restart handshakes.

use crate::barrier::{BarrierError, Party};
use crate::common::{coord_label, FireOutcome, Role, SideId};
use crate::presenter::Presenter;
use crate::protocol::{Message, RestartSignal, Shot, StartSignal};
use crate::restart::RestartAction;
use crate::turn::{Shooter, TurnState};

use super::{MatchMode, Session};

impl<P: Presenter> Session<P> {
    pub(super) fn on_message(&mut self, msg: Message) {
        match msg {
            Message::Name(name) => {
                let name = name.trim();
                if !name.is_empty() {
                    self.opponent_name = Some(name.to_string());
                }
            }
            Message::Chat(text) => self.presenter.on_chat_line(&text),
            Message::Start(signal) => self.on_start_signal(signal),
            Message::Place {
                row,
                col,
                length,
                horizontal,
            } => self.on_remote_place(row, col, length, horizontal),
            Message::Move(shot) => self.on_remote_move(shot),
            Message::Restart(signal) => self.on_remote_restart(signal),
            // the reader turns DISCONNECT into a Closed event
            Message::Disconnect => {}
        }
    }

    fn on_start_signal(&mut self, signal: StartSignal) {
        match signal {
            StartSignal::Start => {
                if self.role != Role::Client {
                    log::warn!("Ignoring START from a client");
                    return;
                }
                self.outbox.push(Message::Name(self.config.name.clone()));
                self.outbox.push(Message::Start(StartSignal::AckStart));
                let text = format!("{} started a new game.", self.opponent());
                self.notice(&text);
                self.begin_match(MatchMode::Peer);
            }
            StartSignal::AckStart => {
                if self.role != Role::Host {
                    log::warn!("Ignoring ACK_START sent to a client");
                    return;
                }
                let text = format!("{} joined the game.", self.opponent());
                self.notice(&text);
            }
            StartSignal::Placed => self.on_remote_placed(),
        }
    }

    /// The peer's fleet is down. Releases the barrier if ours is too.
    fn on_remote_placed(&mut self) {
        if self.mode != Some(MatchMode::Peer) {
            log::warn!("PLACED received with no networked match running");
            return;
        }
        match self.barrier.signal(Party::Remote) {
            Ok(true) => log::debug!("Peer placed last; battle starts on release"),
            Ok(false) => {
                let text = format!("{} has placed their ships.", self.opponent());
                self.notice(&text);
            }
            Err(BarrierError::AlreadySignalled(_)) => {
                log::warn!("Duplicate PLACED from peer ignored");
            }
            Err(BarrierError::Broken) => log::debug!("PLACED after the barrier was aborted"),
        }
    }

    /// Mirror one of the peer's ship placements onto the opponent side.
    fn on_remote_place(&mut self, row: usize, col: usize, length: usize, horizontal: bool) {
        if self.mode != Some(MatchMode::Peer) || self.turn.state() == TurnState::GameOver {
            log::warn!("PLACE received outside a running networked match");
            return;
        }
        let opponent = self.engine.side_mut(SideId::Opponent);
        match opponent.place_segment(row, col, length, horizontal) {
            Ok(_) => self.grid_changed(SideId::Opponent),
            Err(e) => log::warn!(
                "Ignoring PLACE {},{},{},{}: {}",
                row,
                col,
                length,
                horizontal,
                e
            ),
        }
    }

    fn on_remote_move(&mut self, shot: Shot) {
        if self.mode != Some(MatchMode::Peer) || self.turn.state() != TurnState::RemoteTurn {
            log::warn!("Ignoring out-of-turn MOVE {:?} in {:?}", shot, self.turn.state());
            return;
        }
        match shot {
            Shot::Forfeit => {
                let text = format!("{} forfeited the turn.", self.opponent());
                self.notice(&text);
                self.after_shot(Shooter::Remote, None);
            }
            Shot::At { row, col } => {
                let report = self.engine.receive_fire(row, col);
                if report.outcome == FireOutcome::Invalid {
                    log::warn!(
                        "Peer fired at {} which was already fired upon; ignored",
                        coord_label(row, col)
                    );
                    return;
                }
                let who = self.opponent().to_string();
                self.narrate_shot(&who, row, col, &report);
                self.grid_changed(SideId::Local);
                self.after_shot(Shooter::Remote, report.loser);
            }
        }
    }

    fn on_remote_restart(&mut self, signal: RestartSignal) {
        if self.link.is_none() || self.mode != Some(MatchMode::Peer) {
            log::warn!("RESTART {:?} received with no networked match", signal);
            return;
        }
        match self.restart.on_remote(signal) {
            RestartAction::AwaitLocalConsent => {
                let text = format!("{} wants to restart. Type restart to agree.", self.opponent());
                self.notice(&text);
            }
            RestartAction::AgreeAndReset => {
                self.outbox.push(Message::Restart(RestartSignal::Agree));
                self.restart_match();
            }
            RestartAction::Reset => self.restart_match(),
            RestartAction::SendRequest | RestartAction::Ignore => {
                log::debug!("RESTART {:?} needs no action", signal);
            }
        }
    }

    /// The local user's restart request, or consent to the peer's.
    pub(super) fn request_restart(&mut self) {
        match self.mode {
            None => return self.notice("There is no game to restart."),
            Some(MatchMode::Local) => {
                self.notice("Restarting.");
                self.begin_match(MatchMode::Local);
                return;
            }
            Some(MatchMode::Peer) => {}
        }
        match self.restart.request_local() {
            RestartAction::SendRequest => {
                self.outbox.push(Message::Restart(RestartSignal::Request));
                let text = format!("Restart requested. Waiting for {}...", self.opponent());
                self.notice(&text);
            }
            RestartAction::AgreeAndReset => {
                self.outbox.push(Message::Restart(RestartSignal::Agree));
                self.restart_match();
            }
            _ => self.notice("Restart already requested."),
        }
    }

    fn restart_match(&mut self) {
        self.notice("Both players agreed. Restarting.");
        self.begin_match(MatchMode::Peer);
    }
}
