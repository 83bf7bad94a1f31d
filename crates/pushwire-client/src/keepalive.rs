//! Keepalive loop.
//!
//! Sends one ping per period through the shared writer until stopped. The
//! first failed write ends the loop; pings are never retried.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use pushwire_core::error::Result;

use crate::transport::ControlFrame;

/// Anything that can put a control frame on the wire.
#[async_trait]
pub trait ControlWriter: Send + Sync {
    async fn send_control(&self, frame: ControlFrame, deadline: Duration) -> Result<()>;
}

/// Run until `stop` fires (returns `Ok`) or a ping cannot be written (returns the error).
pub async fn run<W>(
    writer: &W,
    period: Duration,
    write_wait: Duration,
    stop: CancellationToken,
) -> Result<()>
where
    W: ControlWriter + ?Sized,
{
    let mut tick = interval_at(Instant::now() + period, period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = stop.cancelled() => {
                tracing::debug!("keepalive stopped");
                return Ok(());
            }

            _ = tick.tick() => {
                tracing::debug!("sending keepalive ping");
                writer
                    .send_control(ControlFrame::Ping(Bytes::new()), write_wait)
                    .await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use pushwire_core::error::PushError;

    use super::*;

    /// Counts pings; fails the write numbered `fail_at` (1-based).
    struct FakeWriter {
        sent: AtomicUsize,
        fail_at: Option<usize>,
    }

    impl FakeWriter {
        fn new(fail_at: Option<usize>) -> Self {
            Self { sent: AtomicUsize::new(0), fail_at }
        }
    }

    #[async_trait]
    impl ControlWriter for FakeWriter {
        async fn send_control(&self, frame: ControlFrame, _deadline: Duration) -> Result<()> {
            assert!(matches!(frame, ControlFrame::Ping(ref p) if p.is_empty()));
            let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(n) == self.fail_at {
                return Err(PushError::Write("broken pipe".into()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn pings_every_period_until_stopped() {
        let writer = FakeWriter::new(None);
        let stop = CancellationToken::new();
        let stopper = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(175)).await;
            stopper.cancel();
        });

        run(&writer, Duration::from_millis(50), Duration::from_millis(10), stop)
            .await
            .unwrap();

        let sent = writer.sent.load(Ordering::SeqCst);
        assert!((2..=4).contains(&sent), "sent {sent} pings");
    }

    #[tokio::test]
    async fn first_write_failure_ends_loop() {
        let writer = FakeWriter::new(Some(2));
        let err = run(
            &writer,
            Duration::from_millis(10),
            Duration::from_millis(10),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code().as_str(), "WRITE");
        assert_eq!(writer.sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_before_first_tick_sends_nothing() {
        let writer = FakeWriter::new(None);
        let stop = CancellationToken::new();
        stop.cancel();
        run(&writer, Duration::from_millis(10), Duration::from_millis(10), stop)
            .await
            .unwrap();
        assert_eq!(writer.sent.load(Ordering::SeqCst), 0);
    }
}
