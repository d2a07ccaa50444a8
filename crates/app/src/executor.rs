//! Automation executor: consumes run signals from the bus and applies each
//! automation's action to the orders it selects.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use ordercron_domain::automation::AutomationPatch;
use ordercron_domain::order::{OrderAction, OrderSnapshot};
use ordercron_domain::query::build_search;
use ordercron_domain::run::{RunReport, RunSignal};
use ordercron_domain::time::Zone;

use crate::gate::StoreGate;
use crate::ports::{AutomationStore, OrderMutator, OrderSource};

pub struct Executor<S, O, M> {
    store: S,
    source: O,
    mutator: M,
    gate: StoreGate,
    zone: Zone,
}

impl<S, O, M> Executor<S, O, M>
where
    S: AutomationStore + Send + Sync + 'static,
    O: OrderSource + Send + Sync + 'static,
    M: OrderMutator + Send + Sync + 'static,
{
    pub fn new(store: S, source: O, mutator: M, gate: StoreGate, zone: Zone) -> Self {
        Self {
            store,
            source,
            mutator,
            gate,
            zone,
        }
    }

    /// Spawn the worker on `signals` until shutdown or the bus closes.
    pub fn start(
        self,
        signals: broadcast::Receiver<RunSignal>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tracing::info!("executor started");
        tokio::spawn(self.run(signals, shutdown))
    }

    async fn run(
        self,
        mut signals: broadcast::Receiver<RunSignal>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            tokio::select! {
                received = signals.recv() => match received {
                    Ok(signal) => {
                        self.execute(&signal).await;
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "executor lagged behind the run bus, signals dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("executor stopped");
    }

    /// Run one signal to completion. Never fails: every problem is logged and
    /// reflected in the returned report.
    #[tracing::instrument(skip_all, fields(automation_id = %signal.automation_id, run_id = %signal.run_id))]
    pub async fn execute(&self, signal: &RunSignal) -> RunReport {
        let action = OrderAction::parse(&signal.action);
        let plan = build_search(&signal.search_query, signal.fired_at, &self.zone);

        let (orders, used_snapshot) = match self.source.select(&plan.params).await {
            Ok(orders) => (orders, false),
            Err(err) => {
                tracing::warn!(%err, "live selection failed, using stored snapshot");
                (signal.orders_snapshot.clone(), true)
            }
        };

        let mut report = RunReport {
            selected: orders.len(),
            used_snapshot,
            ..RunReport::default()
        };

        if action.is_supported() {
            self.apply_all(&orders, &action, &mut report).await;
        } else {
            tracing::warn!(%action, "nothing to apply");
        }

        if !used_snapshot {
            self.refresh_snapshot(signal, orders).await;
        }

        tracing::info!(
            selected = report.selected,
            succeeded = report.succeeded,
            failed = report.failed,
            used_snapshot = report.used_snapshot,
            "run finished"
        );
        report
    }

    async fn apply_all(&self, orders: &[OrderSnapshot], action: &OrderAction, report: &mut RunReport) {
        for order in orders {
            let Some(order_id) = order.id() else {
                report.failed += 1;
                tracing::warn!("order without id skipped");
                continue;
            };
            match self.mutator.apply(&order_id, action).await {
                Ok(()) => report.succeeded += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(%order_id, %err, "order mutation failed");
                }
            }
        }
    }

    async fn refresh_snapshot(&self, signal: &RunSignal, orders: Vec<OrderSnapshot>) {
        let _gate = self.gate.enter().await;
        let patch = AutomationPatch::default().orders_snapshot(orders);
        match self.store.update(signal.automation_id, patch).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::debug!("automation gone, snapshot not refreshed"),
            Err(err) => tracing::warn!(%err, "snapshot refresh failed"),
        }
    }
}
