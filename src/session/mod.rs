//! The match session: one tokio task that owns every piece of match state.
//!
//! User commands, timer ticks, connection completions and link events all
//! arrive on queues and are handled one at a time by [`Session::run`]. The
//! link reader task only decodes lines; it never touches match state.
//! Handlers are synchronous and queue outbound messages in an outbox that
//! is flushed to the link after each event.

mod sync;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::barrier::{Party, ReadyBarrier};
use crate::common::{coord_label, on_board, FireOutcome, Role, SideId};
use crate::config::{validate_port, SessionConfig};
use crate::fire::ShotReport;
use crate::game::{GameEngine, MatchOutcome, Tally};
use crate::grid::Grid;
use crate::link::{self, HostListener, LinkAttachment, LinkError, LinkEvent, PeerLink};
use crate::presenter::{ConnectionEvent, Presenter};
use crate::protocol::{Message, Shot, StartSignal};
use crate::restart::{RestartHandshake, RestartVote};
use crate::transport::tcp::TcpTransport;
use crate::turn::{PreBattleTick, Shooter, TurnCoordinator, TurnState, TurnTick};
use crate::ai;

/// Requests from the presentation layer.
pub enum Command {
    /// Listen on `port` and accept one peer.
    Host { port: u32 },
    /// Connect to a host.
    Join { address: String, port: u32 },
    /// Use an already established link, e.g. an in-memory pair.
    Attach(LinkAttachment),
    /// Host: start a networked match. Without a link: start a local match
    /// against the scripted opponent.
    Start,
    /// Place the next ship of the fleet (catalog order).
    PlaceShip { row: usize, col: usize, horizontal: bool },
    /// Randomly place every ship still unplaced.
    AutoPlace,
    Fire { row: usize, col: usize },
    Chat(String),
    /// Ask for (or agree to) a restart.
    Restart,
    SwapView,
    Disconnect,
    Shutdown,
}

enum Internal {
    Tick { timer_id: u64 },
    Listening { attempt: u64, port: u16 },
    Linked { attempt: u64, role: Role, result: Result<TcpTransport, LinkError> },
    /// Both fleets of barrier generation `generation` are down.
    Released { generation: u64 },
}

/// Whether the current match is played over a link or against the
/// scripted opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Local,
    Peer,
}

/// Read-only view of the session published after every event.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    /// Bumped every time a match starts or is reset.
    pub epoch: u64,
    pub role: Role,
    pub connected: bool,
    pub mode: Option<MatchMode>,
    pub turn: TurnState,
    pub can_fire: bool,
    pub in_pre_battle: bool,
    pub time_remaining: Option<u32>,
    pub restart_vote: RestartVote,
    pub tally: Tally,
    pub outcome: Option<MatchOutcome>,
    pub local_grid: Grid,
    pub opponent_grid: Grid,
    pub ships_to_place: usize,
    pub local_ready: bool,
    pub remote_ready: bool,
    pub showing_own_grid: bool,
    pub opponent_name: Option<String>,
}

impl MatchSnapshot {
    pub fn in_battle(&self) -> bool {
        matches!(self.turn, TurnState::LocalTurn | TurnState::RemoteTurn)
    }
}

/// Cloneable handle used to drive a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    commands: UnboundedSender<Command>,
    snapshot: watch::Receiver<MatchSnapshot>,
}

impl SessionHandle {
    pub fn send(&self, cmd: Command) -> anyhow::Result<()> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Session has shut down"))
    }

    pub fn host(&self, port: u32) -> anyhow::Result<()> {
        self.send(Command::Host { port })
    }

    pub fn join(&self, address: impl Into<String>, port: u32) -> anyhow::Result<()> {
        self.send(Command::Join {
            address: address.into(),
            port,
        })
    }

    pub fn attach(&self, attachment: LinkAttachment) -> anyhow::Result<()> {
        self.send(Command::Attach(attachment))
    }

    pub fn start(&self) -> anyhow::Result<()> {
        self.send(Command::Start)
    }

    pub fn place_ship(&self, row: usize, col: usize, horizontal: bool) -> anyhow::Result<()> {
        self.send(Command::PlaceShip { row, col, horizontal })
    }

    pub fn auto_place(&self) -> anyhow::Result<()> {
        self.send(Command::AutoPlace)
    }

    pub fn fire(&self, row: usize, col: usize) -> anyhow::Result<()> {
        self.send(Command::Fire { row, col })
    }

    pub fn chat(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.send(Command::Chat(text.into()))
    }

    pub fn restart(&self) -> anyhow::Result<()> {
        self.send(Command::Restart)
    }

    pub fn swap_view(&self) -> anyhow::Result<()> {
        self.send(Command::SwapView)
    }

    pub fn disconnect(&self) -> anyhow::Result<()> {
        self.send(Command::Disconnect)
    }

    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.send(Command::Shutdown)
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `pred`.
    pub async fn wait_until<F>(&self, mut pred: F) -> anyhow::Result<MatchSnapshot>
    where
        F: FnMut(&MatchSnapshot) -> bool,
    {
        let mut rx = self.snapshot.clone();
        let snap = rx
            .wait_for(|s| pred(s))
            .await
            .map_err(|_| anyhow::anyhow!("Session has shut down"))?;
        Ok(snap.clone())
    }
}

pub struct Session<P: Presenter> {
    config: SessionConfig,
    presenter: P,
    rng: SmallRng,
    engine: GameEngine,
    turn: TurnCoordinator,
    barrier: ReadyBarrier,
    restart: RestartHandshake,
    role: Role,
    mode: Option<MatchMode>,
    epoch: u64,
    opponent_name: Option<String>,

    link: Option<PeerLink>,
    link_rx: Option<UnboundedReceiver<LinkEvent>>,
    pending: Option<JoinHandle<()>>,
    attempt: u64,
    outbox: Vec<Message>,

    timer: Option<(u64, JoinHandle<()>)>,
    next_timer_id: u64,

    commands: UnboundedReceiver<Command>,
    internal_tx: UnboundedSender<Internal>,
    internal_rx: UnboundedReceiver<Internal>,
    snapshot_tx: watch::Sender<MatchSnapshot>,
}

impl<P: Presenter> Session<P> {
    pub fn new(config: SessionConfig, presenter: P) -> (Self, SessionHandle) {
        let rng = match config.seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            }
        };
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (internal_tx, internal_rx) = mpsc::unbounded_channel();
        let turn = TurnCoordinator::new(config.turn_ticks, config.pre_battle_ticks);
        let session = Session {
            config,
            presenter,
            rng,
            engine: GameEngine::new(),
            turn,
            barrier: ReadyBarrier::new(),
            restart: RestartHandshake::new(),
            role: Role::Unset,
            mode: None,
            epoch: 0,
            opponent_name: None,
            link: None,
            link_rx: None,
            pending: None,
            attempt: 0,
            outbox: Vec::new(),
            timer: None,
            next_timer_id: 0,
            commands: cmd_rx,
            internal_tx,
            internal_rx,
            snapshot_tx: watch::channel(placeholder_snapshot()).0,
        };
        session.publish();
        let snapshot_rx = session.snapshot_tx.subscribe();
        let handle = SessionHandle {
            commands: cmd_tx,
            snapshot: snapshot_rx,
        };
        (session, handle)
    }

    /// Start the session on the current runtime.
    pub fn spawn(config: SessionConfig, presenter: P) -> (SessionHandle, JoinHandle<()>) {
        let (session, handle) = Session::new(config, presenter);
        let task = tokio::spawn(session.run());
        (handle, task)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => {
                        self.shutdown().await;
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                },
                Some(event) = self.internal_rx.recv() => self.handle_internal(event).await,
                event = next_link_event(&mut self.link_rx) => self.handle_link_event(event).await,
            }
            self.flush_outbox().await;
            self.publish();
        }
        self.publish();
        log::debug!("Session stopped");
    }

    // ---- command handling ------------------------------------------------

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Host { port } => self.host(port),
            Command::Join { address, port } => self.join(address, port),
            Command::Attach(attachment) => self.attach(attachment),
            Command::Start => self.start(),
            Command::PlaceShip { row, col, horizontal } => self.place_ship(row, col, horizontal),
            Command::AutoPlace => self.auto_place(),
            Command::Fire { row, col } => self.fire(row, col),
            Command::Chat(text) => self.chat(&text),
            Command::Restart => self.request_restart(),
            Command::SwapView => self.swap_view(),
            Command::Disconnect => self.disconnect().await,
            Command::Shutdown => {}
        }
    }

    fn can_connect(&mut self) -> bool {
        if self.link.is_some() || self.pending.is_some() {
            self.notice("Already connected or connecting. Disconnect first.");
            return false;
        }
        if self.mode == Some(MatchMode::Local) && self.match_running() {
            self.notice("Finish the local game before going online.");
            return false;
        }
        true
    }

    fn host(&mut self, port: u32) {
        if !self.can_connect() {
            return;
        }
        let port = match validate_port(port) {
            Ok(p) => p,
            Err(e) => return self.connection_failed(e.to_string()),
        };
        self.role = Role::Host;
        self.attempt += 1;
        let attempt = self.attempt;
        let tx = self.internal_tx.clone();
        self.pending = Some(tokio::spawn(async move {
            let listener = match HostListener::bind(port as u32).await {
                Ok(l) => l,
                Err(e) => {
                    let _ = tx.send(Internal::Linked { attempt, role: Role::Host, result: Err(e) });
                    return;
                }
            };
            let _ = tx.send(Internal::Listening { attempt, port: listener.port() });
            let result = listener.accept().await;
            let _ = tx.send(Internal::Linked { attempt, role: Role::Host, result });
        }));
    }

    fn join(&mut self, address: String, port: u32) {
        if !self.can_connect() {
            return;
        }
        let port = match validate_port(port) {
            Ok(p) => p,
            Err(e) => return self.connection_failed(e.to_string()),
        };
        let address = if address.trim().is_empty() {
            crate::config::DEFAULT_ADDRESS.to_string()
        } else {
            address.trim().to_string()
        };
        self.role = Role::Client;
        self.attempt += 1;
        let attempt = self.attempt;
        let tx = self.internal_tx.clone();
        self.notice(&format!("Connecting to {}:{}...", address, port));
        self.pending = Some(tokio::spawn(async move {
            let result = link::connect(&address, port as u32).await;
            let _ = tx.send(Internal::Linked { attempt, role: Role::Client, result });
        }));
    }

    fn attach(&mut self, attachment: LinkAttachment) {
        if !self.can_connect() {
            return;
        }
        let LinkAttachment { role, link, events } = attachment;
        self.install_link(role, link, events, None);
    }

    fn install_link(
        &mut self,
        role: Role,
        link: PeerLink,
        events: UnboundedReceiver<LinkEvent>,
        peer: Option<String>,
    ) {
        self.pending = None;
        self.role = role;
        self.link = Some(link);
        self.link_rx = Some(events);
        self.presenter
            .on_connection_status(ConnectionEvent::Connected { peer });
        match role {
            Role::Client => {
                self.notice("Connected. Waiting for the host to start the game.");
                let hello = format!("{} connected", self.config.name);
                self.outbox.push(Message::Chat(hello));
            }
            _ => self.notice("Opponent connected. Type start to begin."),
        }
    }

    fn start(&mut self) {
        if self.link.is_none() {
            if self.pending.is_some() {
                return self.notice("Not connected yet.");
            }
            if self.match_running() {
                return self.notice("A game is already running.");
            }
            self.begin_match(MatchMode::Local);
            return;
        }
        if self.role != Role::Host {
            return self.notice("Only the host can start the game.");
        }
        if self.match_running() {
            return self.notice("A game is already running.");
        }
        self.outbox.push(Message::Name(self.config.name.clone()));
        self.outbox.push(Message::Start(StartSignal::Start));
        self.begin_match(MatchMode::Peer);
    }

    fn place_ship(&mut self, row: usize, col: usize, horizontal: bool) {
        if !on_board(row, col) {
            return self.notice(&format!("{} is off the board.", coord_label(row, col)));
        }
        if self.mode.is_none() || self.turn.state() != TurnState::Placing {
            return self.notice("You can't place ships right now.");
        }
        if self.awaiting_restart() {
            return self.notice("Restart requested. Wait for the new game before placing ships.");
        }
        let side = self.engine.side_mut(SideId::Local);
        let Some(next) = side.fleet.next_unplaced().and_then(|i| side.fleet.ship(i)) else {
            return self.notice("All ships are already placed.");
        };
        let (name, length) = (next.name(), next.length());
        if let Err(e) = side.place_next(row, col, horizontal) {
            log::debug!("Rejected placement of {} at ({}, {}): {}", name, row, col, e);
            return self.notice(&format!("Can't place {} at {}.", name, coord_label(row, col)));
        }
        if self.mode == Some(MatchMode::Peer) {
            self.outbox.push(Message::Place { row, col, length, horizontal });
        }
        self.grid_changed(SideId::Local);
        self.after_placement();
    }

    fn auto_place(&mut self) {
        if self.mode.is_none() || self.turn.state() != TurnState::Placing {
            return self.notice("You can't place ships right now.");
        }
        if self.awaiting_restart() {
            return self.notice("Restart requested. Wait for the new game before placing ships.");
        }
        let placed = match self
            .engine
            .side_mut(SideId::Local)
            .place_remaining_randomly(&mut self.rng)
        {
            Ok(p) => p,
            Err(e) => return self.notice(&format!("Automatic placement failed: {}", e)),
        };
        if self.mode == Some(MatchMode::Peer) {
            for (row, col, length, horizontal) in placed {
                self.outbox.push(Message::Place { row, col, length, horizontal });
            }
        }
        self.grid_changed(SideId::Local);
        self.after_placement();
    }

    /// Our restart request is out: nothing more of the old match may go on
    /// the wire, or the peer would count it toward the next one.
    fn awaiting_restart(&self) -> bool {
        self.restart.vote() == RestartVote::RequestedByLocal
    }

    fn after_placement(&mut self) {
        match self.engine.local().fleet.next_unplaced() {
            Some(_) => self.prompt_next_ship(),
            None => self.local_fleet_ready(),
        }
    }

    fn fire(&mut self, row: usize, col: usize) {
        if !on_board(row, col) {
            return self.notice(&format!("{} is off the board.", coord_label(row, col)));
        }
        if self.awaiting_restart() {
            return self.notice("Restart requested. Wait for the new game before firing.");
        }
        if self.mode.is_none() || !self.turn.can_fire() {
            if self.turn.state() == TurnState::LocalTurn && self.turn.in_pre_battle() {
                return self.notice("Hold fire until the battle begins.");
            }
            return self.notice("It's not your turn.");
        }
        let report = self.engine.fire_at_opponent(row, col);
        if report.outcome == FireOutcome::Invalid {
            return self.notice(&format!("You already fired at {}.", coord_label(row, col)));
        }
        if self.mode == Some(MatchMode::Peer) {
            self.outbox.push(Message::Move(Shot::At { row, col }));
        }
        self.narrate_shot("You", row, col, &report);
        self.grid_changed(SideId::Opponent);
        self.after_shot(Shooter::Local, report.loser);
    }

    fn chat(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.link.is_some() {
            let line = format!("{} : {}", self.config.name, text);
            self.presenter.on_chat_line(&line);
            self.outbox.push(Message::Chat(line));
        } else {
            self.presenter.on_chat_line(&format!("You : {}", text));
        }
    }

    fn swap_view(&mut self) {
        match self.turn.swap_view() {
            Ok(own) => {
                let side = if own { SideId::Local } else { SideId::Opponent };
                self.grid_changed(side);
            }
            Err(e) => self.notice(&e.to_string()),
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.disconnect(true).await;
            self.teardown("You disconnected");
        } else if let Some(pending) = self.pending.take() {
            pending.abort();
            self.role = Role::Unset;
            self.notice("Stopped waiting for a connection.");
        } else {
            self.notice("Not connected.");
        }
    }

    async fn shutdown(&mut self) {
        self.flush_outbox().await;
        if let Some(mut link) = self.link.take() {
            link.disconnect(true).await;
        }
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        self.cancel_timer();
        self.barrier.abort();
        self.link_rx = None;
    }

    // ---- internal events -------------------------------------------------

    async fn handle_internal(&mut self, event: Internal) {
        match event {
            Internal::Tick { timer_id } => self.on_tick(timer_id),
            Internal::Listening { attempt, port } if attempt == self.attempt => {
                let address = link::local_address().to_string();
                self.notice(&format!("Hosting on {}:{}. Waiting for an opponent...", address, port));
                self.presenter
                    .on_connection_status(ConnectionEvent::Listening { address, port });
            }
            Internal::Linked { attempt, role, result } if attempt == self.attempt => {
                match result {
                    Ok(transport) => {
                        let peer = transport.peer_addr().map(|a| a.to_string());
                        let (link, events) = PeerLink::start(role, transport);
                        self.install_link(role, link, events, peer);
                    }
                    Err(e) => {
                        self.pending = None;
                        self.role = Role::Unset;
                        self.connection_failed(e.to_string());
                    }
                }
            }
            Internal::Released { generation } => {
                let current = generation == self.barrier.generation() && self.barrier.is_released();
                if current && self.turn.state() == TurnState::WaitingForOpponentReady {
                    self.start_battle();
                } else {
                    log::debug!("Stale barrier release for generation {}", generation);
                }
            }
            Internal::Listening { .. } | Internal::Linked { .. } => {
                log::debug!("Ignoring result of a cancelled connection attempt");
            }
        }
    }

    async fn handle_link_event(&mut self, event: Option<LinkEvent>) {
        match event {
            Some(LinkEvent::Message(msg)) => self.on_message(msg),
            Some(LinkEvent::Malformed { error, .. }) => {
                self.notice(&format!("Ignored a bad message from the opponent: {}", error));
            }
            Some(LinkEvent::Closed(reason)) => {
                if let Some(mut link) = self.link.take() {
                    link.disconnect(false).await;
                    self.teardown(&reason.to_string());
                }
            }
            None => {
                // reader gone without a Closed event
                self.link_rx = None;
                if let Some(mut link) = self.link.take() {
                    link.disconnect(false).await;
                    self.teardown("connection lost");
                }
            }
        }
    }

    /// Drop everything tied to the link. The link itself is already closed.
    fn teardown(&mut self, reason: &str) {
        self.link = None;
        self.link_rx = None;
        self.outbox.clear();
        self.cancel_timer();
        self.barrier.abort();
        self.restart.clear();
        let during_match = self.mode == Some(MatchMode::Peer) && self.match_running();
        if during_match {
            self.engine.record_outcome(MatchOutcome::Aborted);
            self.turn.finish();
            self.presenter.on_turn_changed(self.turn.state());
            self.presenter.on_game_over(None);
        }
        if self.mode == Some(MatchMode::Peer) {
            self.mode = None;
        }
        self.role = Role::Unset;
        self.opponent_name = None;
        self.presenter.on_connection_status(ConnectionEvent::Disconnected {
            reason: reason.to_string(),
            during_match,
        });
        if during_match {
            self.notice(&format!("Disconnected ({}). The game was aborted.", reason));
        } else {
            self.notice(&format!("Disconnected ({}).", reason));
        }
    }

    async fn flush_outbox(&mut self) {
        if self.outbox.is_empty() {
            return;
        }
        let outbox = std::mem::take(&mut self.outbox);
        let Some(link) = self.link.as_mut() else {
            log::debug!("Dropping {} outbound message(s): no link", outbox.len());
            return;
        };
        for msg in &outbox {
            if let Err(e) = link.send(msg).await {
                // the reader reports the broken link
                log::warn!("Failed to send {}: {}", msg.kind(), e);
                break;
            }
        }
    }

    // ---- match flow ------------------------------------------------------

    fn match_running(&self) -> bool {
        self.mode.is_some() && self.turn.state() != TurnState::GameOver
    }

    /// Fresh grids, fleets, turn state, barrier generation and vote.
    fn begin_match(&mut self, mode: MatchMode) {
        self.cancel_timer();
        self.engine.reset();
        self.turn.reset();
        self.barrier.reset();
        self.await_barrier();
        self.restart.clear();
        self.mode = Some(mode);
        self.epoch += 1;
        log::info!("Match {} begins ({:?})", self.epoch, mode);

        if mode == MatchMode::Local {
            let placed = self
                .engine
                .side_mut(SideId::Opponent)
                .place_remaining_randomly(&mut self.rng);
            if let Err(e) = placed {
                log::warn!("Scripted opponent could not place its fleet: {}", e);
            }
            if let Err(e) = self.barrier.signal(Party::Remote) {
                log::warn!("Scripted opponent ready signal: {}", e);
            }
        }
        self.presenter.on_turn_changed(self.turn.state());
        self.grid_changed(SideId::Local);
        self.grid_changed(SideId::Opponent);
        self.prompt_next_ship();
    }

    /// Park a waiter on the current barrier generation. The battle starts
    /// when it comes back released; an abort or reset just ends it.
    fn await_barrier(&mut self) {
        let mut waiter = self.barrier.waiter();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            match waiter.wait().await {
                Ok(generation) => {
                    let _ = tx.send(Internal::Released { generation });
                }
                Err(e) => log::debug!("Ready barrier {}: {}", waiter.generation(), e),
            }
        });
    }

    fn prompt_next_ship(&mut self) {
        let local = &self.engine.local().fleet;
        if let Some(ship) = local.next_unplaced().and_then(|i| local.ship(i)) {
            let text = format!("Place your {} ({} cells).", ship.name(), ship.length());
            self.notice(&text);
        }
    }

    fn local_fleet_ready(&mut self) {
        if let Err(e) = self.turn.fleet_placed() {
            log::warn!("Fleet placed in unexpected state: {}", e);
            return;
        }
        self.presenter.on_turn_changed(self.turn.state());
        if self.mode == Some(MatchMode::Peer) {
            self.outbox.push(Message::Start(StartSignal::Placed));
        }
        match self.barrier.signal(Party::Local) {
            Ok(true) => log::debug!("Both fleets placed"),
            Ok(false) => {
                let text = format!("Waiting for {} to place their ships...", self.opponent());
                self.notice(&text);
            }
            Err(e) => log::warn!("Local ready signal: {}", e),
        }
    }

    /// Both fleets are down: pick the first shooter and run the pre-battle
    /// narration before the first turn.
    fn start_battle(&mut self) {
        let local_first = match self.mode {
            Some(MatchMode::Peer) => self.role == Role::Host,
            _ => true,
        };
        match self.turn.begin_battle(local_first) {
            Ok(state) => self.presenter.on_turn_changed(state),
            Err(e) => return log::warn!("Cannot begin battle: {}", e),
        }
        self.notice("All ships are placed!");
        let text = format!("Battle begins in {}...", self.config.pre_battle_ticks);
        self.notice(&text);
        self.start_timer();
    }

    fn on_tick(&mut self, timer_id: u64) {
        match self.timer {
            Some((id, _)) if id == timer_id => {}
            _ => return,
        }
        if self.turn.in_pre_battle() {
            match self.turn.pre_battle_tick() {
                Some(PreBattleTick::Counting(n)) => self.notice(&format!("{}...", n)),
                Some(PreBattleTick::Finished) | None => {
                    self.cancel_timer();
                    self.enter_turn();
                }
            }
            return;
        }
        match self.turn.tick() {
            Some(TurnTick::Remaining(n)) => self.presenter.on_time_remaining(n),
            Some(TurnTick::Expired) => {
                self.presenter.on_time_remaining(0);
                self.forfeit();
            }
            None => self.cancel_timer(),
        }
    }

    /// Announce the turn and arm whatever drives it.
    fn enter_turn(&mut self) {
        match self.turn.state() {
            TurnState::LocalTurn => {
                self.notice("Your turn. Fire!");
                match self.turn.start_countdown() {
                    Ok(limit) => {
                        self.presenter.on_time_remaining(limit);
                        self.start_timer();
                    }
                    Err(e) => log::warn!("Countdown not armed: {}", e),
                }
            }
            TurnState::RemoteTurn => {
                let text = format!("{}'s turn.", self.opponent());
                self.notice(&text);
                if self.mode == Some(MatchMode::Local) {
                    self.scripted_shot();
                }
            }
            _ => {}
        }
    }

    /// Countdown ran out: pass the turn with no grid effect.
    fn forfeit(&mut self) {
        self.cancel_timer();
        if self.mode == Some(MatchMode::Peer) {
            let notice = format!("{} ran out of time.", self.config.name);
            self.outbox.push(Message::Chat(notice));
            self.outbox.push(Message::Move(Shot::Forfeit));
        }
        self.notice("Time's up! You forfeit this turn.");
        self.after_shot(Shooter::Local, None);
    }

    fn scripted_shot(&mut self) {
        let target = self.engine.local();
        let remaining = target.fleet.remaining_lengths();
        let Some((row, col)) = ai::choose_target(&target.grid, &remaining, &mut self.rng) else {
            log::warn!("Scripted opponent has no cell left to fire at");
            return;
        };
        let report = self.engine.receive_fire(row, col);
        let who = self.opponent().to_string();
        self.narrate_shot(&who, row, col, &report);
        self.grid_changed(SideId::Local);
        self.after_shot(Shooter::Remote, report.loser);
    }

    /// Common tail of every resolved shot, real or forfeited.
    fn after_shot(&mut self, shooter: Shooter, loser: Option<SideId>) {
        self.cancel_timer();
        let state = match self.turn.shot_resolved(shooter, loser.is_some()) {
            Ok(s) => s,
            Err(e) => return log::warn!("Shot resolved out of turn: {}", e),
        };
        self.presenter.on_turn_changed(state);
        if state == TurnState::GameOver {
            self.game_over(loser);
        } else {
            self.enter_turn();
        }
    }

    fn game_over(&mut self, loser: Option<SideId>) {
        let winner = loser.map(SideId::other);
        let outcome = match winner {
            Some(SideId::Local) => MatchOutcome::Won,
            Some(SideId::Opponent) => MatchOutcome::Lost,
            None => MatchOutcome::Aborted,
        };
        self.engine.record_outcome(outcome);
        self.presenter.on_game_over(winner);
        match outcome {
            MatchOutcome::Won => self.notice("You won! All enemy ships are sunk."),
            MatchOutcome::Lost => self.notice("You lost! Your fleet is destroyed."),
            MatchOutcome::Aborted => self.notice("Game over."),
        }
        let tally = self.engine.tally();
        self.notice(&format!("Wins: {}  Losses: {}", tally.wins, tally.losses));
    }

    // ---- timers ----------------------------------------------------------

    /// Replace the live timer with a new periodic one.
    fn start_timer(&mut self) {
        self.cancel_timer();
        self.next_timer_id += 1;
        let timer_id = self.next_timer_id;
        let period = self.config.tick;
        let tx = self.internal_tx.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Internal::Tick { timer_id }).is_err() {
                    break;
                }
            }
        });
        self.timer = Some((timer_id, handle));
    }

    fn cancel_timer(&mut self) {
        if let Some((_, handle)) = self.timer.take() {
            handle.abort();
        }
    }

    // ---- presentation helpers -------------------------------------------

    fn notice(&mut self, text: &str) {
        log::debug!("notice: {}", text);
        self.presenter.on_chat_line(text);
    }

    fn connection_failed(&mut self, reason: String) {
        log::warn!("{}", reason);
        self.notice(&reason);
        self.presenter
            .on_connection_status(ConnectionEvent::Failed(reason));
    }

    fn grid_changed(&mut self, side: SideId) {
        let grid = self.engine.side(side).grid;
        self.presenter.on_grid_changed(side, &grid);
    }

    fn opponent(&self) -> &str {
        match (&self.opponent_name, self.mode) {
            (Some(name), _) => name,
            (None, Some(MatchMode::Local)) => "Computer",
            _ => "Opponent",
        }
    }

    fn narrate_shot(&mut self, who: &str, row: usize, col: usize, report: &ShotReport) {
        let result = match report.outcome {
            FireOutcome::Hit => "Hit!",
            FireOutcome::Miss => "Miss.",
            FireOutcome::Invalid => return,
        };
        self.notice(&format!("{} fired at {}. {}", who, coord_label(row, col), result));
        if let Some(ship) = report.sunk {
            self.notice(&format!("{} sunk!", ship));
        }
    }

    fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            epoch: self.epoch,
            role: self.role,
            connected: self.link.is_some(),
            mode: self.mode,
            turn: self.turn.state(),
            can_fire: self.mode.is_some() && self.turn.can_fire(),
            in_pre_battle: self.turn.in_pre_battle(),
            time_remaining: self.turn.remaining(),
            restart_vote: self.restart.vote(),
            tally: self.engine.tally(),
            outcome: self.engine.outcome(),
            local_grid: self.engine.local().grid,
            opponent_grid: self.engine.opponent().grid,
            ships_to_place: self
                .engine
                .local()
                .fleet
                .ships()
                .iter()
                .filter(|s| !s.is_placed())
                .count(),
            local_ready: self.barrier.has_signalled(Party::Local),
            remote_ready: self.barrier.has_signalled(Party::Remote),
            showing_own_grid: self.turn.showing_own_grid(),
            opponent_name: self.opponent_name.clone(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

fn placeholder_snapshot() -> MatchSnapshot {
    MatchSnapshot {
        epoch: 0,
        role: Role::Unset,
        connected: false,
        mode: None,
        turn: TurnState::Placing,
        can_fire: false,
        in_pre_battle: false,
        time_remaining: None,
        restart_vote: RestartVote::NoRequest,
        tally: Tally::default(),
        outcome: None,
        local_grid: Grid::new(),
        opponent_grid: Grid::new(),
        ships_to_place: crate::config::NUM_SHIPS,
        local_ready: false,
        remote_ready: false,
        showing_own_grid: true,
        opponent_name: None,
    }
}

async fn next_link_event(rx: &mut Option<UnboundedReceiver<LinkEvent>>) -> Option<LinkEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
