//! Automation store port: persistence for automation records.

use std::future::Future;
use std::sync::Arc;

use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::OrderCronError;
use ordercron_domain::id::AutomationId;

/// Durable collection of [`AutomationRecord`]s.
///
/// Every write is committed before its future resolves.
pub trait AutomationStore {
    /// Persist a new record, assigning its id and `created_at`.
    fn save(
        &self,
        automation: NewAutomation,
    ) -> impl Future<Output = Result<AutomationRecord, OrderCronError>> + Send;

    /// Apply the supplied fields of `patch`.
    ///
    /// Resolves to `None` when the patch is empty or no record has `id`.
    fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<AutomationId>, OrderCronError>> + Send;

    fn get(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationRecord>, OrderCronError>> + Send;

    /// All records, newest-created first.
    fn list(&self) -> impl Future<Output = Result<Vec<AutomationRecord>, OrderCronError>> + Send;

    /// Remove a record; deleting an unknown id is not an error.
    fn delete(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<DeleteOutcome, OrderCronError>> + Send;
}

impl<T: AutomationStore + Send + Sync> AutomationStore for Arc<T> {
    fn save(
        &self,
        automation: NewAutomation,
    ) -> impl Future<Output = Result<AutomationRecord, OrderCronError>> + Send {
        (**self).save(automation)
    }

    fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> impl Future<Output = Result<Option<AutomationId>, OrderCronError>> + Send {
        (**self).update(id, patch)
    }

    fn get(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<Option<AutomationRecord>, OrderCronError>> + Send {
        (**self).get(id)
    }

    fn list(&self) -> impl Future<Output = Result<Vec<AutomationRecord>, OrderCronError>> + Send {
        (**self).list()
    }

    fn delete(
        &self,
        id: AutomationId,
    ) -> impl Future<Output = Result<DeleteOutcome, OrderCronError>> + Send {
        (**self).delete(id)
    }
}
