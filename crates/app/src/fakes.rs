//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::{CollaboratorError, OrderCronError};
use ordercron_domain::id::AutomationId;
use ordercron_domain::order::{OrderAction, OrderSnapshot, SearchParameters};
use ordercron_domain::run::RunSignal;
use ordercron_domain::time::{Timestamp, parse_instant};

use crate::ports::{AutomationStore, OrderMutator, OrderSource, RunSignalSink};

pub fn ts(s: &str) -> Timestamp {
    parse_instant(s).unwrap()
}

pub fn record(id: i64) -> AutomationRecord {
    NewAutomation::builder()
        .label(format!("automation {id}"))
        .schedule("daily")
        .action("apply tag follow-up")
        .search_query("pending orders")
        .build()
        .unwrap()
        .into_record(AutomationId::new(id).unwrap(), ts("2025-01-01T00:00:00Z"))
}

fn storage_failure(reason: &str) -> OrderCronError {
    OrderCronError::Storage(reason.to_string().into())
}

#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<i64, AutomationRecord>>,
    next_id: Mutex<i64>,
    pub fail_list: AtomicBool,
    /// Ids whose `get` fails.
    pub broken: Mutex<Vec<i64>>,
}

impl InMemoryStore {
    pub fn with(records: Vec<AutomationRecord>) -> Self {
        let store = Self::default();
        {
            let mut map = store.records.lock().unwrap();
            let mut next = store.next_id.lock().unwrap();
            for rec in records {
                *next = (*next).max(rec.id.get());
                map.insert(rec.id.get(), rec);
            }
        }
        store
    }

    pub fn snapshot(&self, id: i64) -> Option<AutomationRecord> {
        self.records.lock().unwrap().get(&id).cloned()
    }
}

impl AutomationStore for InMemoryStore {
    fn save(
        &self,
        automation: NewAutomation,
    ) -> impl Future<Output = Result<AutomationRecord, OrderCronError>> + Send {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let record = automation.into_record(
            AutomationId::new(*next).unwrap(),
            ts("2025-01-01T00:00:00Z") + chrono::TimeDelta::seconds(*next),
        );
        self.records
            .lock()
            .unwrap()
            .insert(record.id.get(), record.clone());
        async { Ok(record) }
    }

    fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<AutomationId>, OrderCronError>> + Send {
        let mut map = self.records.lock().unwrap();
        let result = match map.get_mut(&id.get()) {
            Some(rec) if !patch.is_empty() => {
                patch.apply_to(rec);
                Some(id)
            }
            _ => None,
        };
        async move { Ok(result) }
    }

    fn get(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationRecord>, OrderCronError>> + Send {
        let result = if self.broken.lock().unwrap().contains(&id.get()) {
            Err(storage_failure("disk on fire"))
        } else {
            Ok(self.records.lock().unwrap().get(&id.get()).cloned())
        };
        async { result }
    }

    fn list(&self) -> impl Future<Output = Result<Vec<AutomationRecord>, OrderCronError>> + Send {
        let result = if self.fail_list.load(Ordering::SeqCst) {
            Err(storage_failure("database is locked"))
        } else {
            let mut all: Vec<_> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(all)
        };
        async { result }
    }

    fn delete(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<DeleteOutcome, OrderCronError>> + Send {
        let removed = self.records.lock().unwrap().remove(&id.get());
        let deleted = u64::from(removed.is_some());
        async move { Ok(DeleteOutcome { deleted }) }
    }
}

/// Collects every emitted signal; optionally fails, stalls or never
/// completes every emission.
#[derive(Default)]
pub struct RecordingSink {
    pub signals: Mutex<Vec<RunSignal>>,
    pub fail: AtomicBool,
    pub hang: AtomicBool,
    pub delay: Mutex<Option<Duration>>,
}

impl RecordingSink {
    pub fn emitted(&self) -> Vec<RunSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl RunSignalSink for RecordingSink {
    fn emit(&self, signal: RunSignal) -> impl Future<Output = Result<(), OrderCronError>> + Send {
        let result: Result<(), OrderCronError> = if self.fail.load(Ordering::SeqCst) {
            Err(CollaboratorError::Delivery("executor offline".to_string()).into())
        } else {
            self.signals.lock().unwrap().push(signal);
            Ok(())
        };
        let hang = self.hang.load(Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        async move {
            if hang {
                std::future::pending::<()>().await;
            }
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        }
    }
}

/// Serves a fixed order list and remembers the last filters it was asked for.
#[derive(Default)]
pub struct FixedOrders {
    pub orders: Vec<OrderSnapshot>,
    pub fail: bool,
    pub last_params: Mutex<Option<SearchParameters>>,
}

impl OrderSource for FixedOrders {
    fn select(
        &self,
        params: &SearchParameters,
    ) -> impl Future<Output = Result<Vec<OrderSnapshot>, OrderCronError>> + Send {
        *self.last_params.lock().unwrap() = Some(params.clone());
        let result: Result<Vec<OrderSnapshot>, OrderCronError> = if self.fail {
            Err(CollaboratorError::Selection("backend unreachable".to_string()).into())
        } else {
            Ok(self.orders.clone())
        };
        async { result }
    }
}

/// Records applied mutations; fails for the listed order ids.
#[derive(Default)]
pub struct RecordingMutator {
    pub applied: Mutex<Vec<(String, OrderAction)>>,
    pub failing_ids: Vec<String>,
}

impl OrderMutator for RecordingMutator {
    fn apply(
        &self,
        order_id: &str,
        action: &OrderAction,
    ) -> impl Future<Output = Result<(), OrderCronError>> + Send {
        let result: Result<(), OrderCronError> = if self.failing_ids.iter().any(|id| id == order_id) {
            Err(CollaboratorError::Mutation {
                order_id: order_id.to_string(),
                reason: "rejected".to_string(),
            }
            .into())
        } else {
            self.applied
                .lock()
                .unwrap()
                .push((order_id.to_string(), action.clone()));
            Ok(())
        };
        async { result }
    }
}
