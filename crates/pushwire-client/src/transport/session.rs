//! Transport session: the single duplex websocket connection.
//!
//! The session is split on open:
//! - `SessionWriter` is shared (keepalive + close) and serializes frames
//!   behind an async mutex so control frames never interleave on the wire.
//! - `SessionReader` is owned by the read loop and enforces the
//!   peer-liveness deadline, re-armed by every pong.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use pushwire_core::error::{PushError, Result};

use crate::config::TimingSection;
use crate::endpoint::Endpoint;
use crate::keepalive::ControlWriter;
use crate::transport::codec::{decode, ControlFrame, Inbound};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open connection, not yet split between its writer and reader.
pub struct Session {
    writer: SessionWriter,
    reader: SessionReader,
}

impl Session {
    /// Dial the connector endpoint.
    pub async fn open(endpoint: &Endpoint, timing: &TimingSection) -> Result<Self> {
        Self::open_url(endpoint.url().as_str(), timing).await
    }

    /// Dial an arbitrary websocket URL (`ws` or `wss`).
    pub async fn open_url(url: &str, timing: &TimingSection) -> Result<Self> {
        let (ws, _resp) = timeout(timing.connect_timeout(), connect_async(url))
            .await
            .map_err(|_| {
                PushError::Connection(format!("timed out after {:?}", timing.connect_timeout()))
            })?
            .map_err(|e| PushError::Connection(e.to_string()))?;

        let (sink, stream) = ws.split();
        Ok(Self {
            writer: SessionWriter {
                sink: Arc::new(Mutex::new(sink)),
            },
            reader: SessionReader::new(stream, timing.pong_wait()),
        })
    }

    pub fn into_split(self) -> (SessionWriter, SessionReader) {
        (self.writer, self.reader)
    }
}

/// Shared write half.
#[derive(Clone)]
pub struct SessionWriter {
    sink: Arc<Mutex<SplitSink<WsStream, Message>>>,
}

impl SessionWriter {
    /// Send one control frame; `deadline` bounds lock wait plus write.
    pub async fn send_control(&self, frame: ControlFrame, deadline: Duration) -> Result<()> {
        let kind = frame.kind();
        let msg = frame.into_message();
        timeout(deadline, async {
            let mut sink = self.sink.lock().await;
            sink.send(msg).await
        })
        .await
        .map_err(|_| PushError::Write(format!("{kind} frame not written within {deadline:?}")))?
        .map_err(|e| PushError::Write(format!("{kind} frame: {e}")))
    }

    /// Two-phase close.
    ///
    /// Sends a normal-closure frame bounded by `write_wait`, then gives the
    /// peer up to `grace` to finish its side (`peer_done` resolves once the
    /// read half has seen the close), then shuts the write half regardless.
    pub async fn close<F>(&self, write_wait: Duration, grace: Duration, peer_done: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let sent = self.send_control(ControlFrame::Close, write_wait).await;
        if sent.is_ok() && timeout(grace, peer_done).await.is_err() {
            tracing::debug!(?grace, "peer did not finish close handshake within grace period");
        }

        let shut = timeout(write_wait, async {
            let mut sink = self.sink.lock().await;
            sink.close().await
        })
        .await;
        if let Ok(Err(e)) = shut {
            tracing::debug!(error = %e, "write half shutdown failed");
        }

        sent.map_err(|e| PushError::Close(e.to_string()))
    }
}

#[async_trait]
impl ControlWriter for SessionWriter {
    async fn send_control(&self, frame: ControlFrame, deadline: Duration) -> Result<()> {
        SessionWriter::send_control(self, frame, deadline).await
    }
}

/// Result of waiting for the next data frame.
#[derive(Debug)]
pub enum ReadOutcome {
    Frame(Bytes),
    /// The peer closed the connection normally.
    Closed,
}

/// Read half with the sliding peer-liveness deadline.
pub struct SessionReader {
    stream: SplitStream<WsStream>,
    pong_wait: Duration,
    deadline: Instant,
}

impl SessionReader {
    fn new(stream: SplitStream<WsStream>, pong_wait: Duration) -> Self {
        Self {
            stream,
            pong_wait,
            deadline: Instant::now() + pong_wait,
        }
    }

    /// Wait for the next text/binary frame.
    ///
    /// Pongs re-arm the liveness deadline and are not returned. Missing the
    /// deadline is a `PushError::Read`.
    pub async fn read_frame(&mut self) -> Result<ReadOutcome> {
        loop {
            let next = timeout_at(self.deadline, self.stream.next())
                .await
                .map_err(|_| {
                    PushError::Read(format!("no pong from peer within {:?}", self.pong_wait))
                })?;

            let msg = match next {
                None => return Ok(ReadOutcome::Closed),
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => {
                    return Ok(ReadOutcome::Closed)
                }
                Some(Err(e)) => return Err(PushError::Read(e.to_string())),
                Some(Ok(msg)) => msg,
            };

            match decode(msg) {
                Inbound::Data(bytes) => return Ok(ReadOutcome::Frame(bytes)),
                Inbound::Pong => {
                    self.deadline = Instant::now() + self.pong_wait;
                    tracing::trace!("pong received, liveness deadline re-armed");
                }
                // tungstenite queues the pong reply itself
                Inbound::Ping => {}
                Inbound::Raw => tracing::trace!("raw frame ignored"),
                Inbound::Close(code) => {
                    tracing::debug!(?code, "peer sent close frame");
                    return Ok(ReadOutcome::Closed);
                }
            }
        }
    }
}
