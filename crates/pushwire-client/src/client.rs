//! Stream client: lifecycle controller for one connector connection.
//!
//! Responsibilities:
//! - Own the output queues (created once, consumers get the read halves)
//! - connect: open the session, then run keepalive + read loop as tasks
//! - Surface background failures on the error queue
//! - close: two-phase close, then force teardown of both loops
//!
//! Two stop signals exist. The caller's `CancellationToken` is cooperative:
//! keepalive stops at once, the read loop stops before its next read. The
//! internal teardown token fired by `close` interrupts an in-flight read or a
//! delivery blocked on a slow consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use pushwire_core::error::{PushError, Result};

use crate::config::{ClientConfig, TimingSection};
use crate::dispatch::{queues, EventStreams, QueueSink, Router};
use crate::endpoint::Endpoint;
use crate::keepalive::{self, ControlWriter};
use crate::transport::{ReadOutcome, Session, SessionReader, SessionWriter};

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Unconnected,
    Connecting,
    Connected,
    Closing,
    Closed,
    /// The read loop stopped on an unrecoverable error.
    Faulted,
}

pub struct Client {
    endpoint: Endpoint,
    timing: TimingSection,
    router: Arc<Router<QueueSink>>,
    errors: mpsc::Sender<PushError>,
    state: Arc<watch::Sender<ConnState>>,
    active: Mutex<Option<Active>>,
}

/// Handles of a running connection.
struct Active {
    writer: SessionWriter,
    teardown: CancellationToken,
    keepalive_stop: CancellationToken,
    read_done: CancellationToken,
    peer_closed: CancellationToken,
    read_task: JoinHandle<()>,
    keepalive_task: JoinHandle<()>,
}

/// Why the read loop ended without an error.
#[derive(Debug)]
enum ReadExit {
    Cancelled,
    PeerClosed,
    TornDown,
}

impl Client {
    /// Build a client and the consumer side of its queues.
    pub fn new(cfg: &ClientConfig) -> Result<(Self, EventStreams)> {
        cfg.validate()?;
        let endpoint = Endpoint::from_config(&cfg.endpoint)?;
        Ok(Self::with_endpoint(endpoint, cfg.timing.clone()))
    }

    pub fn with_endpoint(endpoint: Endpoint, timing: TimingSection) -> (Self, EventStreams) {
        let (sink, errors, streams) = queues();
        let (state, _) = watch::channel(ConnState::Unconnected);
        let client = Self {
            endpoint,
            timing,
            router: Arc::new(Router::new(sink)),
            errors,
            state: Arc::new(state),
            active: Mutex::new(None),
        };
        (client, streams)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn state(&self) -> ConnState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnState> {
        self.state.subscribe()
    }

    /// Open the connector session and start streaming.
    ///
    /// Returns once both loops are running; later failures arrive on the
    /// error queue. A failed dial leaves the client `Closed`, from where it
    /// may connect again with the same queues.
    pub async fn connect(&self, cancel: CancellationToken) -> Result<()> {
        self.begin_connect()?;
        tracing::info!(endpoint = %self.endpoint.redacted(), "connecting");

        let session = match Session::open(&self.endpoint, &self.timing).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(code = e.code().as_str(), error = %e, "connect failed");
                self.state.send_replace(ConnState::Closed);
                return Err(e);
            }
        };
        self.start(session, cancel).await
    }

    /// Start streaming over a session opened elsewhere.
    pub async fn connect_with(&self, session: Session, cancel: CancellationToken) -> Result<()> {
        self.begin_connect()?;
        self.start(session, cancel).await
    }

    fn begin_connect(&self) -> Result<()> {
        let mut from = ConnState::Unconnected;
        let moved = self.state.send_if_modified(|s| {
            from = *s;
            match *s {
                ConnState::Unconnected | ConnState::Closed => {
                    *s = ConnState::Connecting;
                    true
                }
                _ => false,
            }
        });
        if moved {
            Ok(())
        } else {
            Err(PushError::InvalidState(format!("cannot connect from {from:?}")))
        }
    }

    async fn start(&self, session: Session, cancel: CancellationToken) -> Result<()> {
        let (writer, reader) = session.into_split();
        let pinger = writer.clone();
        self.launch(writer, reader, pinger, cancel).await
    }

    /// Spawn the read loop and the keepalive loop; `pinger` carries the pings.
    async fn launch<P>(
        &self,
        writer: SessionWriter,
        reader: SessionReader,
        pinger: P,
        cancel: CancellationToken,
    ) -> Result<()>
    where
        P: ControlWriter + 'static,
    {
        let mut active = self.active.lock().await;

        // A stream that ended on its own is still parked here.
        if let Some(stale) = active.take() {
            if let Err(e) = shutdown(stale, &self.timing).await {
                tracing::debug!(error = %e, "previous session closed without handshake");
            }
        }

        // close() may have run while we were dialing.
        let moved = self.state.send_if_modified(|s| {
            if *s == ConnState::Connecting {
                *s = ConnState::Connected;
                true
            } else {
                false
            }
        });
        if !moved {
            return Err(PushError::InvalidState(
                "client was closed while connecting".into(),
            ));
        }

        let teardown = CancellationToken::new();
        let keepalive_stop = cancel.child_token();
        let read_done = CancellationToken::new();
        let peer_closed = CancellationToken::new();

        let read_task = tokio::spawn(read_loop(
            reader,
            Arc::clone(&self.router),
            self.errors.clone(),
            Arc::clone(&self.state),
            ReadSignals {
                cancel,
                teardown: teardown.clone(),
                keepalive_stop: keepalive_stop.clone(),
                read_done: read_done.clone(),
                peer_closed: peer_closed.clone(),
            },
        ));

        let keepalive_task = tokio::spawn(keepalive_loop(
            pinger,
            self.timing.ping_period(),
            self.timing.write_wait(),
            keepalive_stop.clone(),
            self.errors.clone(),
            teardown.clone(),
        ));

        *active = Some(Active {
            writer,
            teardown,
            keepalive_stop,
            read_done,
            peer_closed,
            read_task,
            keepalive_task,
        });

        tracing::info!(endpoint = %self.endpoint.redacted(), "stream connected");
        Ok(())
    }

    /// Close the connection.
    ///
    /// The client ends up `Closed` whether or not the peer acknowledged the
    /// close frame; a failed handshake is still reported as `PushError::Close`.
    /// Closing a client that never connected (or is already closed) is a no-op.
    /// After the peer closed the stream, `close` only releases the session.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.active.lock().await;

        let moved = self.state.send_if_modified(|s| match *s {
            ConnState::Connecting | ConnState::Connected | ConnState::Faulted => {
                *s = ConnState::Closing;
                true
            }
            _ => false,
        });
        if !moved {
            // The read loop may have ended the stream and left the session parked.
            return match guard.take() {
                Some(active) => shutdown(active, &self.timing).await,
                None => Ok(()),
            };
        }

        let Some(active) = guard.take() else {
            // Still dialing; start() sees Closed and gives up.
            self.state.send_replace(ConnState::Closed);
            return Ok(());
        };

        tracing::info!("closing stream");
        let handshake = shutdown(active, &self.timing).await;

        self.state.send_replace(ConnState::Closed);
        match &handshake {
            Ok(()) => tracing::info!("stream closed"),
            Err(e) => tracing::warn!(error = %e, "stream closed without handshake"),
        }
        handshake
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.active.try_lock() {
            if let Some(active) = guard.take() {
                active.teardown.cancel();
                active.keepalive_stop.cancel();
            }
        }
    }
}

/// Two-phase close of one session, then stop both loops.
async fn shutdown(active: Active, timing: &TimingSection) -> Result<()> {
    active.keepalive_stop.cancel();
    let handshake = if active.peer_closed.is_cancelled() {
        // Peer already completed the close handshake.
        Ok(())
    } else {
        let read_done = active.read_done.clone();
        active
            .writer
            .close(timing.write_wait(), timing.close_grace(), async move {
                read_done.cancelled().await
            })
            .await
    };

    active.teardown.cancel();
    if let Err(e) = active.read_task.await {
        tracing::debug!(error = %e, "read task join failed");
    }
    if let Err(e) = active.keepalive_task.await {
        tracing::debug!(error = %e, "keepalive task join failed");
    }
    drop(active.writer);
    handshake
}

struct ReadSignals {
    cancel: CancellationToken,
    teardown: CancellationToken,
    keepalive_stop: CancellationToken,
    read_done: CancellationToken,
    peer_closed: CancellationToken,
}

async fn read_loop(
    mut reader: SessionReader,
    router: Arc<Router<QueueSink>>,
    errors: mpsc::Sender<PushError>,
    state: Arc<watch::Sender<ConnState>>,
    signals: ReadSignals,
) {
    let outcome = tokio::select! {
        _ = signals.teardown.cancelled() => Ok(ReadExit::TornDown),
        r = pump(&mut reader, &router, &signals.cancel) => r,
    };

    // The connection is finished either way; stop pinging it.
    signals.keepalive_stop.cancel();

    match outcome {
        Ok(exit) => {
            tracing::debug!(?exit, "read loop finished");
            if matches!(exit, ReadExit::PeerClosed) {
                signals.peer_closed.cancel();
            }
            // Nothing reads the session any more; a teardown is close()'s to finish.
            if !matches!(exit, ReadExit::TornDown) {
                state.send_if_modified(|s| {
                    if *s == ConnState::Connected {
                        *s = ConnState::Closed;
                        true
                    } else {
                        false
                    }
                });
            }
        }
        Err(e) => {
            tracing::warn!(code = e.code().as_str(), error = %e, "read loop terminated");
            state.send_if_modified(|s| {
                if *s == ConnState::Connected {
                    *s = ConnState::Faulted;
                    true
                } else {
                    false
                }
            });
            report(&errors, e, &signals.teardown).await;
        }
    }
    signals.read_done.cancel();
}

/// Read, decode and route frames until the peer closes or `cancel` is seen.
async fn pump(
    reader: &mut SessionReader,
    router: &Router<QueueSink>,
    cancel: &CancellationToken,
) -> Result<ReadExit> {
    loop {
        if cancel.is_cancelled() {
            return Ok(ReadExit::Cancelled);
        }
        match reader.read_frame().await? {
            ReadOutcome::Closed => {
                tracing::info!("peer closed the stream");
                return Ok(ReadExit::PeerClosed);
            }
            ReadOutcome::Frame(bytes) => {
                let n = router.route_frame(&bytes).await?;
                tracing::trace!(dispatched = n, frame_bytes = bytes.len(), "frame routed");
            }
        }
    }
}

async fn keepalive_loop<P: ControlWriter>(
    writer: P,
    period: Duration,
    write_wait: Duration,
    stop: CancellationToken,
    errors: mpsc::Sender<PushError>,
    teardown: CancellationToken,
) {
    if let Err(e) = keepalive::run(&writer, period, write_wait, stop).await {
        tracing::warn!(code = e.code().as_str(), error = %e, "keepalive terminated");
        report(&errors, e, &teardown).await;
    }
}

/// Hand a terminal error to the consumer, unless the client is being torn down.
async fn report(errors: &mpsc::Sender<PushError>, e: PushError, teardown: &CancellationToken) {
    tokio::select! {
        biased;

        sent = errors.send(e) => {
            if sent.is_err() {
                tracing::debug!("error queue has no consumer");
            }
        }
        _ = teardown.cancelled() => {}
    }
}
