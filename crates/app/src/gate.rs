//! The store gate: one async lock serializing every write path.
//!
//! Service writes and the scheduler's re-read/decide/write sequence all
//! enter the same gate, so a user update can never interleave with a tick
//! advancing the same record.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct StoreGate(Arc<Mutex<()>>);

impl StoreGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access; released when the guard drops.
    pub async fn enter(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}
