use std::io::ErrorKind;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::transport::{LineSink, LineSource, Transport, MAX_LINE_LEN};

/// Default timeout for connect and write operations (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_timeout(stream, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(stream: TcpStream, timeout_duration: Duration) -> Self {
        // one message per line, no batching
        let _ = stream.set_nodelay(true);
        Self {
            stream,
            timeout_duration,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = timeout(DEFAULT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| anyhow::anyhow!("Connect timeout after {:?}", DEFAULT_TIMEOUT))??;
        Ok(Self::new(stream))
    }

    pub fn peer_addr(&self) -> Option<std::net::SocketAddr> {
        self.stream.peer_addr().ok()
    }
}

impl Transport for TcpTransport {
    fn into_split(self) -> (Box<dyn LineSource>, Box<dyn LineSink>) {
        let (read, write) = self.stream.into_split();
        (
            Box::new(TcpLineSource {
                reader: BufReader::new(read),
            }),
            Box::new(TcpLineSink {
                writer: write,
                timeout_duration: self.timeout_duration,
                closed: false,
            }),
        )
    }
}

pub struct TcpLineSource {
    reader: BufReader<OwnedReadHalf>,
}

fn map_read_err(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        ErrorKind::ConnectionReset => anyhow::anyhow!("Connection reset by peer"),
        _ => anyhow::anyhow!("Read error: {}", e),
    }
}

fn map_write_err(e: std::io::Error) -> anyhow::Error {
    if e.kind() == ErrorKind::BrokenPipe || e.kind() == ErrorKind::ConnectionReset {
        anyhow::anyhow!("Connection closed by peer")
    } else {
        anyhow::anyhow!("Write error: {}", e)
    }
}

#[async_trait]
impl LineSource for TcpLineSource {
    async fn recv_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut buf = Vec::new();
        // newline included, so one byte of slack over the limit
        let n = (&mut self.reader)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await
            .map_err(map_read_err)?;
        if n == 0 {
            return Ok(None);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if buf.len() > MAX_LINE_LEN {
            return Err(anyhow::anyhow!(
                "Message too large: more than {} bytes without a newline",
                MAX_LINE_LEN
            ));
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}

pub struct TcpLineSink {
    writer: OwnedWriteHalf,
    timeout_duration: Duration,
    closed: bool,
}

#[async_trait]
impl LineSink for TcpLineSink {
    async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        if self.closed {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');

        let send_op = async {
            self.writer.write_all(&data).await.map_err(map_write_err)?;
            self.writer.flush().await.map_err(map_write_err)?;
            anyhow::Ok(())
        };
        timeout(self.timeout_duration, send_op)
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
    }

    async fn close(&mut self) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer.shutdown().await.map_err(map_write_err)
    }
}
