//! Shared application state for axum handlers.

use std::sync::Arc;

use ordercron_app::run_bus::InProcessRunBus;
use ordercron_app::services::automation_service::AutomationService;
use ordercron_app::services::query_service::QueryService;

/// Application state shared across all axum handlers.
///
/// Generic over the store type to avoid dynamic dispatch. `Clone` is
/// implemented manually so the store itself need not be `Clone`.
pub struct AppState<S> {
    pub automation_service: Arc<AutomationService<S>>,
    pub query_service: QueryService,
    /// Source of the SSE run stream.
    pub run_bus: InProcessRunBus,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            automation_service: Arc::clone(&self.automation_service),
            query_service: self.query_service,
            run_bus: self.run_bus.clone(),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(
        automation_service: Arc<AutomationService<S>>,
        query_service: QueryService,
        run_bus: InProcessRunBus,
    ) -> Self {
        Self {
            automation_service,
            query_service,
            run_bus,
        }
    }
}
