//! In-process run bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use ordercron_domain::error::OrderCronError;
use ordercron_domain::run::RunSignal;

use crate::ports::RunSignalSink;

/// Fan-out of [`RunSignal`]s to the executor and any live SSE streams.
///
/// Emitting never blocks and succeeds even when nobody is subscribed
/// (the signal is simply dropped). Slow subscribers lag rather than
/// back-pressure the scheduler.
#[derive(Clone)]
pub struct InProcessRunBus {
    sender: broadcast::Sender<RunSignal>,
}

impl InProcessRunBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every signal emitted *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RunSignal> {
        self.sender.subscribe()
    }
}

impl RunSignalSink for InProcessRunBus {
    fn emit(&self, signal: RunSignal) -> impl Future<Output = Result<(), OrderCronError>> + Send {
        let receivers = self.sender.send(signal).unwrap_or(0);
        tracing::trace!(receivers, "run signal broadcast");
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{record, ts};

    #[tokio::test]
    async fn should_deliver_signal_to_every_subscriber() {
        let bus = InProcessRunBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let signal = RunSignal::fire(&record(1), ts("2025-10-15T12:00:00Z"));
        let run_id = signal.run_id;
        bus.emit(signal).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().run_id, run_id);
        assert_eq!(rx2.recv().await.unwrap().run_id, run_id);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessRunBus::new(8);
        let signal = RunSignal::fire(&record(1), ts("2025-10-15T12:00:00Z"));
        assert!(bus.emit(signal).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_replay_signals_emitted_before_subscription() {
        let bus = InProcessRunBus::new(8);
        bus.emit(RunSignal::fire(&record(1), ts("2025-10-15T12:00:00Z")))
            .await
            .unwrap();

        let mut rx = bus.subscribe();
        bus.emit(RunSignal::fire(&record(2), ts("2025-10-15T12:01:00Z")))
            .await
            .unwrap();

        assert_eq!(rx.recv().await.unwrap().automation_id.get(), 2);
    }
}
