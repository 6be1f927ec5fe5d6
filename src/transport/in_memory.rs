use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::transport::{LineSink, LineSource, Transport};

/// Process-local transport: two crossed unbounded channels of lines.
pub struct InMemoryTransport {
    tx: UnboundedSender<String>,
    rx: UnboundedReceiver<String>,
}

impl InMemoryTransport {
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            Self { tx: a_tx, rx: a_rx },
            Self { tx: b_tx, rx: b_rx },
        )
    }
}

impl Transport for InMemoryTransport {
    fn into_split(self) -> (Box<dyn LineSource>, Box<dyn LineSink>) {
        (
            Box::new(InMemorySource { rx: self.rx }),
            Box::new(InMemorySink { tx: Some(self.tx) }),
        )
    }
}

pub struct InMemorySource {
    rx: UnboundedReceiver<String>,
}

#[async_trait]
impl LineSource for InMemorySource {
    async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self.rx.recv().await)
    }
}

pub struct InMemorySink {
    tx: Option<UnboundedSender<String>>,
}

#[async_trait]
impl LineSink for InMemorySink {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Transport is shut down"))?;
        tx.send(line.to_string())
            .map_err(|_| anyhow::anyhow!("Connection closed by peer"))
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        self.tx = None;
        Ok(())
    }
}
