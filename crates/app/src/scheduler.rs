//! Scheduler loop: wakes on a fixed cadence, fires due automations and
//! expires stale ones.
//!
//! Each record is handled inside the [`StoreGate`]: the record is re-read by
//! id, classified, and its next state persisted before the gate is released.
//! A failure on one record is logged and does not stop the others; a failure
//! to list records skips the rest of the tick.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use ordercron_domain::error::OrderCronError;
use ordercron_domain::id::AutomationId;
use ordercron_domain::run::RunSignal;
use ordercron_domain::schedule::{Decision, ScheduleState};
use ordercron_domain::time::{self, Timestamp};

use crate::gate::StoreGate;
use crate::ports::{AutomationStore, RunSignalSink};

/// Timing knobs for [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub tick: Duration,
    /// Upper bound on a single run-signal emission.
    pub emit_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(60),
            emit_timeout: Duration::from_secs(5),
        }
    }
}

/// Counts for one pass over the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub examined: usize,
    pub fired: usize,
    pub expired: usize,
    pub failed: usize,
}

enum Outcome {
    Idle,
    Fired,
    Expired,
}

pub struct Scheduler<S, K> {
    store: S,
    sink: K,
    gate: StoreGate,
    config: SchedulerConfig,
}

impl<S, K> Scheduler<S, K>
where
    S: AutomationStore + Send + Sync + 'static,
    K: RunSignalSink + Send + Sync + 'static,
{
    pub fn new(store: S, sink: K, gate: StoreGate, config: SchedulerConfig) -> Self {
        Self {
            store,
            sink,
            gate,
            config,
        }
    }

    /// Spawn the loop; it exits once `shutdown` flips to `true` or its
    /// sender is dropped.
    pub fn start(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tracing::info!(
            tick_secs = self.config.tick.as_secs(),
            "scheduler started"
        );
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match self.tick(time::now()).await {
                Ok(report) => tracing::debug!(?report, "scheduler tick complete"),
                Err(err) => {
                    tracing::warn!(%err, "scheduler tick failed, retrying next interval");
                }
            }
        }
        tracing::info!("scheduler stopped");
    }

    /// Evaluate every stored record once, as seen at `now`.
    ///
    /// # Errors
    ///
    /// Returns the store error when the record list cannot be read. Errors on
    /// individual records are counted in [`TickReport::failed`] instead.
    pub async fn tick(&self, now: Timestamp) -> Result<TickReport, OrderCronError> {
        let records = self.store.list().await?;
        let mut report = TickReport::default();

        for id in records.into_iter().map(|r| r.id) {
            report.examined += 1;
            match self.evaluate(id, now).await {
                Ok(Outcome::Idle) => {}
                Ok(Outcome::Fired) => report.fired += 1,
                Ok(Outcome::Expired) => report.expired += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(automation_id = %id, %err, "automation evaluation failed");
                }
            }
        }
        Ok(report)
    }

    async fn evaluate(&self, id: AutomationId, now: Timestamp) -> Result<Outcome, OrderCronError> {
        let _gate = self.gate.enter().await;
        // Re-read: the record may have changed or vanished since the list.
        let Some(record) = self.store.get(id).await? else {
            return Ok(Outcome::Idle);
        };

        match record.decide(now)? {
            Decision::Idle(state) => {
                if state == ScheduleState::NotStarted {
                    tracing::trace!(automation_id = %id, "window not open yet");
                }
                Ok(Outcome::Idle)
            }
            Decision::Expire(patch) => {
                self.store.update(id, patch).await?;
                tracing::info!(automation_id = %id, end_at = ?record.end_at, "automation expired, disabled");
                Ok(Outcome::Expired)
            }
            Decision::Fire(patch) => {
                let next_run = patch.next_run.flatten();
                self.emit(RunSignal::fire(&record, now)).await;
                self.store.update(id, patch).await?;
                tracing::info!(automation_id = %id, label = %record.label, ?next_run, "automation fired");
                Ok(Outcome::Fired)
            }
        }
    }

    /// Emission failures never propagate: the record advances regardless.
    async fn emit(&self, signal: RunSignal) {
        let automation_id = signal.automation_id;
        let run_id = signal.run_id;
        match tokio::time::timeout(self.config.emit_timeout, self.sink.emit(signal)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(%automation_id, %run_id, %err, "run signal not delivered");
            }
            Err(_) => {
                tracing::warn!(
                    %automation_id,
                    %run_id,
                    timeout = ?self.config.emit_timeout,
                    "run signal emission timed out"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use ordercron_domain::automation::AutomationPatch;

    use super::*;
    use crate::fakes::{InMemoryStore, RecordingSink, record, ts};
    use crate::services::automation_service::AutomationService;

    fn scheduler(
        store: &Arc<InMemoryStore>,
        sink: &Arc<RecordingSink>,
    ) -> Scheduler<Arc<InMemoryStore>, Arc<RecordingSink>> {
        Scheduler::new(
            Arc::clone(store),
            Arc::clone(sink),
            StoreGate::new(),
            SchedulerConfig {
                tick: Duration::from_millis(10),
                emit_timeout: Duration::from_millis(100),
            },
        )
    }

    #[tokio::test]
    async fn should_fire_due_record_and_advance_it() {
        let mut rec = record(1);
        rec.interval_days = 2;
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        let now = ts("2025-10-15T12:00:00Z");

        let report = scheduler(&store, &sink).tick(now).await.unwrap();

        assert_eq!(report.fired, 1);
        let signals = sink.emitted();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].automation_id.get(), 1);
        assert_eq!(signals[0].search_query, "pending orders");
        assert_eq!(signals[0].action, "apply tag follow-up");
        assert_eq!(signals[0].fired_at, now);

        let after = store.snapshot(1).unwrap();
        assert_eq!(after.last_run, Some(now));
        assert_eq!(after.next_run, Some(ts("2025-10-17T12:00:00Z")));
        assert!(after.enabled);
    }

    #[tokio::test]
    async fn should_fire_only_once_per_due_interval() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        let sched = scheduler(&store, &sink);

        sched.tick(ts("2025-10-15T12:00:00Z")).await.unwrap();
        sched.tick(ts("2025-10-15T12:01:00Z")).await.unwrap();

        assert_eq!(sink.emitted().len(), 1);
    }

    #[tokio::test]
    async fn should_disable_expired_record_without_signal() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        rec.end_at = Some(ts("2025-10-15T00:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());

        let report = scheduler(&store, &sink)
            .tick(ts("2025-10-15T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report.expired, 1);
        assert!(sink.emitted().is_empty());
        let after = store.snapshot(1).unwrap();
        assert!(!after.enabled);
        assert_eq!(after.last_run, None);
    }

    #[tokio::test]
    async fn should_leave_waiting_and_disabled_records_untouched() {
        let mut waiting = record(1);
        waiting.next_run = Some(ts("2025-10-16T00:00:00Z"));
        let mut disabled = record(2);
        disabled.enabled = false;
        disabled.next_run = Some(ts("2025-10-01T00:00:00Z"));
        let unscheduled = record(3);
        let store = Arc::new(InMemoryStore::with(vec![
            waiting.clone(),
            disabled.clone(),
            unscheduled.clone(),
        ]));
        let sink = Arc::new(RecordingSink::default());

        let report = scheduler(&store, &sink)
            .tick(ts("2025-10-15T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report, TickReport { examined: 3, ..TickReport::default() });
        assert_eq!(store.snapshot(1).unwrap(), waiting);
        assert_eq!(store.snapshot(2).unwrap(), disabled);
        assert_eq!(store.snapshot(3).unwrap(), unscheduled);
    }

    #[tokio::test]
    async fn should_advance_record_even_when_emission_fails() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let now = ts("2025-10-15T12:00:00Z");

        let report = scheduler(&store, &sink).tick(now).await.unwrap();

        assert_eq!(report.fired, 1);
        assert_eq!(store.snapshot(1).unwrap().last_run, Some(now));
    }

    #[tokio::test]
    async fn should_isolate_failure_of_one_record() {
        let mut broken = record(1);
        broken.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let mut healthy = record(2);
        healthy.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![broken, healthy]));
        store.broken.lock().unwrap().push(1);
        let sink = Arc::new(RecordingSink::default());

        let report = scheduler(&store, &sink)
            .tick(ts("2025-10-15T12:00:00Z"))
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.fired, 1);
        assert_eq!(sink.emitted()[0].automation_id.get(), 2);
    }

    #[tokio::test]
    async fn should_count_overflowing_interval_as_failure_and_keep_going() {
        let mut huge = record(1);
        huge.interval_days = u32::MAX;
        huge.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let mut healthy = record(2);
        healthy.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![huge.clone(), healthy]));
        let sink = Arc::new(RecordingSink::default());
        let now = ts("2025-10-15T12:00:00Z");

        let report = scheduler(&store, &sink).tick(now).await.unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.fired, 1);
        assert_eq!(store.snapshot(1).unwrap(), huge);
        assert_eq!(store.snapshot(2).unwrap().next_run, Some(ts("2025-10-16T12:00:00Z")));
    }

    #[tokio::test]
    async fn should_advance_record_when_emission_never_completes() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        sink.hang.store(true, Ordering::SeqCst);
        let now = ts("2025-10-15T12:00:00Z");

        let report = tokio::time::timeout(
            Duration::from_secs(1),
            scheduler(&store, &sink).tick(now),
        )
        .await
        .expect("tick should be bounded by the emit timeout")
        .unwrap();

        assert_eq!(report.fired, 1);
        let after = store.snapshot(1).unwrap();
        assert_eq!(after.last_run, Some(now));
        assert_eq!(after.next_run, Some(ts("2025-10-16T12:00:00Z")));
    }

    #[tokio::test]
    async fn should_apply_disable_issued_mid_tick_once_the_tick_releases_the_gate() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2025-10-14T09:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        *sink.delay.lock().unwrap() = Some(Duration::from_millis(50));
        let gate = StoreGate::new();
        let sched = Scheduler::new(
            Arc::clone(&store),
            Arc::clone(&sink),
            gate.clone(),
            SchedulerConfig {
                tick: Duration::from_millis(10),
                emit_timeout: Duration::from_millis(500),
            },
        );
        let service = AutomationService::new(Arc::clone(&store), gate);
        let id = AutomationId::new(1).unwrap();
        let now = ts("2025-10-15T12:00:00Z");

        let disable = async {
            // The signal is recorded while the tick holds the gate.
            while sink.emitted().is_empty() {
                tokio::task::yield_now().await;
            }
            service
                .update(id, AutomationPatch::default().enabled(false))
                .await
        };
        let (report, updated) = tokio::join!(sched.tick(now), disable);

        assert_eq!(report.unwrap().fired, 1);
        assert_eq!(updated.unwrap(), Some(id));
        let after = store.snapshot(1).unwrap();
        assert!(!after.enabled);
        assert_eq!(after.last_run, Some(now));

        let next = sched.tick(ts("2025-10-20T12:00:00Z")).await.unwrap();
        assert_eq!(next.fired, 0);
        assert_eq!(sink.emitted().len(), 1);
    }

    #[tokio::test]
    async fn should_propagate_error_when_store_cannot_list() {
        let store = Arc::new(InMemoryStore::default());
        store.fail_list.store(true, Ordering::SeqCst);
        let sink = Arc::new(RecordingSink::default());

        let result = scheduler(&store, &sink).tick(ts("2025-10-15T12:00:00Z")).await;
        assert!(matches!(result, Err(OrderCronError::Storage(_))));
    }

    #[tokio::test]
    async fn should_fire_from_background_loop_and_stop_on_shutdown() {
        let mut rec = record(1);
        rec.next_run = Some(ts("2020-01-01T00:00:00Z"));
        let store = Arc::new(InMemoryStore::with(vec![rec]));
        let sink = Arc::new(RecordingSink::default());
        let (tx, rx) = watch::channel(false);

        let handle = scheduler(&store, &sink).start(rx);
        for _ in 0..50 {
            if !sink.emitted().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(sink.emitted().len(), 1);
    }
}
