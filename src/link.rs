//! Peer connection: host-side accept, client-side connect, a reader task
//! that turns lines into [`LinkEvent`]s, and the writing half used by the
//! session.

use core::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::common::Role;
use crate::config::{validate_port, ConfigError};
use crate::protocol::{Message, ProtocolError};
use crate::transport::{tcp::TcpTransport, LineSink, LineSource, Transport};

/// Why a link stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Peer sent `DISCONNECT`.
    PeerDisconnected,
    /// Stream ended without a `DISCONNECT`.
    EndOfStream,
    /// Read failed.
    Error(String),
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerDisconnected => write!(f, "peer disconnected"),
            CloseReason::EndOfStream => write!(f, "connection closed by peer"),
            CloseReason::Error(e) => write!(f, "{}", e),
        }
    }
}

/// What the reader task reports to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Message(Message),
    /// A line that did not decode. The link stays up.
    Malformed { line: String, error: ProtocolError },
    /// Sent exactly once per link, after which the reader stops.
    Closed(CloseReason),
}

#[derive(Debug)]
pub enum LinkError {
    InvalidPort(ConfigError),
    Bind { port: u16, reason: String },
    Connect { address: String, port: u16, reason: String },
    Accept(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::InvalidPort(e) => write!(f, "{}", e),
            LinkError::Bind { port, reason } => {
                write!(f, "Could not listen on port {}: {}", port, reason)
            }
            LinkError::Connect {
                address,
                port,
                reason,
            } => write!(f, "Could not connect to {}:{}: {}", address, port, reason),
            LinkError::Accept(reason) => write!(f, "Failed to accept connection: {}", reason),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<ConfigError> for LinkError {
    fn from(e: ConfigError) -> Self {
        LinkError::InvalidPort(e)
    }
}

/// A live connection to the other side.
///
/// Dropping the link stops its reader task without telling the peer; call
/// [`PeerLink::disconnect`] for the graceful path.
pub struct PeerLink {
    role: Role,
    sink: Box<dyn LineSink>,
    reader: JoinHandle<()>,
    closed: bool,
    /// Shared with the reader so only one `Closed` is ever emitted.
    finished: Arc<AtomicBool>,
}

impl PeerLink {
    /// Split `transport` and start the reader task.
    pub fn start<T: Transport>(role: Role, transport: T) -> (PeerLink, UnboundedReceiver<LinkEvent>) {
        let (source, sink) = transport.into_split();
        let (tx, rx) = mpsc::unbounded_channel();
        let finished = Arc::new(AtomicBool::new(false));
        let reader = tokio::spawn(read_loop(source, tx, finished.clone()));
        (
            PeerLink {
                role,
                sink,
                reader,
                closed: false,
                finished,
            },
            rx,
        )
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_closed(&self) -> bool {
        self.closed || self.finished.load(Ordering::SeqCst)
    }

    /// Write one message. There is no delivery confirmation; a dead peer
    /// shows up later as a `Closed` event from the reader.
    pub async fn send(&mut self, msg: &Message) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Link is closed"));
        }
        log::debug!("-> {}", msg);
        self.sink.send_line(&msg.encode()).await
    }

    /// Close the link. A second call is a no-op. With `notify_peer` a
    /// `DISCONNECT` is attempted first.
    pub async fn disconnect(&mut self, notify_peer: bool) {
        if self.closed {
            return;
        }
        if notify_peer && !self.finished.load(Ordering::SeqCst) {
            if let Err(e) = self.sink.send_line(&Message::Disconnect.encode()).await {
                log::debug!("DISCONNECT not delivered: {}", e);
            }
        }
        self.closed = true;
        self.finished.store(true, Ordering::SeqCst);
        if let Err(e) = self.sink.close().await {
            log::debug!("Closing link: {}", e);
        }
        self.reader.abort();
        log::info!("Link closed locally ({:?})", self.role);
    }
}

impl Drop for PeerLink {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

fn emit_closed(tx: &UnboundedSender<LinkEvent>, finished: &AtomicBool, reason: CloseReason) {
    if !finished.swap(true, Ordering::SeqCst) {
        log::info!("Link closed: {}", reason);
        let _ = tx.send(LinkEvent::Closed(reason));
    }
}

async fn read_loop(
    mut source: Box<dyn LineSource>,
    tx: UnboundedSender<LinkEvent>,
    finished: Arc<AtomicBool>,
) {
    loop {
        let line = match source.recv_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                emit_closed(&tx, &finished, CloseReason::EndOfStream);
                return;
            }
            Err(e) => {
                emit_closed(&tx, &finished, CloseReason::Error(e.to_string()));
                return;
            }
        };
        log::debug!("<- {}", line);
        let event = match Message::decode(&line) {
            Ok(Message::Disconnect) => {
                emit_closed(&tx, &finished, CloseReason::PeerDisconnected);
                return;
            }
            Ok(msg) => LinkEvent::Message(msg),
            Err(ProtocolError::Empty) => continue,
            Err(error) => {
                log::warn!("Dropping malformed line '{}': {}", line, error);
                LinkEvent::Malformed { line, error }
            }
        };
        if tx.send(event).is_err() {
            // session went away
            return;
        }
    }
}

/// Listening socket for the host role. Accepts a single peer.
pub struct HostListener {
    listener: TcpListener,
    port: u16,
}

impl HostListener {
    /// Validate `port` and bind on all interfaces.
    pub async fn bind(port: u32) -> Result<Self, LinkError> {
        let port = validate_port(port)?;
        let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map_err(|e| LinkError::Bind {
                port,
                reason: e.to_string(),
            })?;
        log::info!("Listening on port {}", port);
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr().ok()
    }

    /// Wait for one peer. The listener is consumed so no second connection
    /// is ever accepted for this match.
    pub async fn accept(self) -> Result<TcpTransport, LinkError> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(|e| LinkError::Accept(e.to_string()))?;
        log::info!("Accepted connection from {}", peer);
        Ok(TcpTransport::new(stream))
    }
}

/// Open a client connection. No retry: callers invoke it again.
pub async fn connect(address: &str, port: u32) -> Result<TcpTransport, LinkError> {
    let port = validate_port(port)?;
    let transport = TcpTransport::connect((address, port))
        .await
        .map_err(|e| LinkError::Connect {
            address: address.to_string(),
            port,
            reason: e.to_string(),
        })?;
    log::info!("Connected to {}:{}", address, port);
    Ok(transport)
}

/// Best guess at the address other machines can reach us on. Falls back to
/// loopback when there is no route.
pub fn local_address() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|sock| {
            // connect on UDP only picks a route, nothing is sent
            sock.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
            sock.local_addr()
        })
        .map(|addr| addr.ip())
        .ok()
        .filter(|ip| !ip.is_unspecified())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// A started link handed to the session together with its role.
pub struct LinkAttachment {
    pub role: Role,
    pub link: PeerLink,
    pub events: UnboundedReceiver<LinkEvent>,
}

impl LinkAttachment {
    pub fn start<T: Transport>(role: Role, transport: T) -> Self {
        let (link, events) = PeerLink::start(role, transport);
        Self { role, link, events }
    }
}
