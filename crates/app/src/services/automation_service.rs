//! Automation service: validated use-cases over the automation store.

use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::{NotFoundError, OrderCronError};
use ordercron_domain::id::AutomationId;

use crate::gate::StoreGate;
use crate::ports::AutomationStore;

/// Application service for automation CRUD.
///
/// Writes go through the shared [`StoreGate`] so they never interleave with
/// a scheduler tick advancing the same record.
pub struct AutomationService<S> {
    store: S,
    gate: StoreGate,
}

impl<S: AutomationStore> AutomationService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S, gate: StoreGate) -> Self {
        Self { store, gate }
    }

    /// Persist a new automation.
    ///
    /// When `next_run` is unset and `start_at` is known, the first run is
    /// scheduled at `start_at`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] if invariants fail, or a
    /// storage error propagated from the store.
    #[tracing::instrument(skip(self, automation), fields(label = %automation.label))]
    pub async fn save(&self, mut automation: NewAutomation) -> Result<AutomationRecord, OrderCronError> {
        automation.validate()?;
        if automation.next_run.is_none() {
            automation.next_run = automation.start_at;
        }
        let _gate = self.gate.enter().await;
        let record = self.store.save(automation).await?;
        tracing::info!(automation_id = %record.id, next_run = ?record.next_run, "automation saved");
        Ok(record)
    }

    /// Apply a partial update.
    ///
    /// Returns `Ok(None)` when `patch` is empty or the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] if a supplied field breaks an
    /// invariant, or a storage error from the store.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> Result<Option<AutomationId>, OrderCronError> {
        if patch.is_empty() {
            return Ok(None);
        }
        patch.validate()?;
        let _gate = self.gate.enter().await;
        self.store.update(id, patch).await
    }

    /// Look up an automation by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::NotFound`] when no automation with `id`
    /// exists, or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AutomationId) -> Result<AutomationRecord, OrderCronError> {
        self.store.get(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Automation",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all automations, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list(&self) -> Result<Vec<AutomationRecord>, OrderCronError> {
        self.store.list().await
    }

    /// Delete an automation by id. Unknown ids report `deleted: 0`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AutomationId) -> Result<DeleteOutcome, OrderCronError> {
        let _gate = self.gate.enter().await;
        self.store.delete(id).await
    }
}
