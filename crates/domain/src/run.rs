//! Run signal: what the scheduler tells the executor when a record fires.

use serde::{Deserialize, Serialize};

use crate::automation::AutomationRecord;
use crate::id::{AutomationId, RunId};
use crate::order::OrderSnapshot;
use crate::time::Timestamp;

/// One firing of one automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSignal {
    pub run_id: RunId,
    pub automation_id: AutomationId,
    pub search_query: String,
    pub action: String,
    pub orders_snapshot: Vec<OrderSnapshot>,
    pub fired_at: Timestamp,
}

impl RunSignal {
    /// Capture the record's selection and action at the moment it fires.
    #[must_use]
    pub fn fire(record: &AutomationRecord, fired_at: Timestamp) -> Self {
        Self {
            run_id: RunId::new(),
            automation_id: record.id,
            search_query: record.search_query.clone(),
            action: record.action.clone(),
            orders_snapshot: record.orders_snapshot.clone(),
            fired_at,
        }
    }
}

/// Outcome of executing one [`RunSignal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub selected: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// `true` when live selection failed and the stored snapshot was used.
    pub used_snapshot: bool,
}
