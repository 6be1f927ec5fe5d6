//! Line transports underneath [`PeerLink`](crate::link::PeerLink).
//!
//! A transport is split once into a reading half and a writing half so the
//! reader task and the session can own one each.

use async_trait::async_trait;

/// Longest inbound line accepted, excluding the newline.
pub const MAX_LINE_LEN: usize = 4096;

/// Reading half: yields one line at a time without its terminator.
#[async_trait]
pub trait LineSource: Send {
    /// `Ok(None)` means the peer closed the stream cleanly.
    async fn recv_line(&mut self) -> anyhow::Result<Option<String>>;
}

/// Writing half: one call per message, newline appended and flushed.
#[async_trait]
pub trait LineSink: Send {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()>;
    async fn close(&mut self) -> anyhow::Result<()>;
}

pub trait Transport: Send + 'static {
    fn into_split(self) -> (Box<dyn LineSource>, Box<dyn LineSink>);
}

pub mod in_memory;
pub mod tcp;
