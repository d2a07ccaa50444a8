//! In-memory store and request helpers for router tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;

use ordercron_app::gate::StoreGate;
use ordercron_app::ports::AutomationStore;
use ordercron_app::run_bus::InProcessRunBus;
use ordercron_app::services::automation_service::AutomationService;
use ordercron_app::services::query_service::QueryService;
use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::OrderCronError;
use ordercron_domain::id::AutomationId;
use ordercron_domain::time::{Zone, parse_instant};

use crate::state::AppState;

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<i64, AutomationRecord>>,
}

impl AutomationStore for MemoryStore {
    async fn save(&self, automation: NewAutomation) -> Result<AutomationRecord, OrderCronError> {
        let mut records = self.records.lock().unwrap();
        let next = records.keys().next_back().copied().unwrap_or(0) + 1;
        let created_at =
            parse_instant("2025-01-01T00:00:00Z").unwrap() + chrono::TimeDelta::seconds(next);
        let record = automation.into_record(AutomationId::new(next).unwrap(), created_at);
        records.insert(next, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: AutomationId,
        patch: AutomationPatch,
    ) -> Result<Option<AutomationId>, OrderCronError> {
        if patch.is_empty() {
            return Ok(None);
        }
        let mut records = self.records.lock().unwrap();
        Ok(records.get_mut(&id.get()).map(|record| {
            patch.apply_to(record);
            id
        }))
    }

    async fn get(&self, id: AutomationId) -> Result<Option<AutomationRecord>, OrderCronError> {
        Ok(self.records.lock().unwrap().get(&id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<AutomationRecord>, OrderCronError> {
        Ok(self.records.lock().unwrap().values().rev().cloned().collect())
    }

    async fn delete(&self, id: AutomationId) -> Result<DeleteOutcome, OrderCronError> {
        let removed = self.records.lock().unwrap().remove(&id.get());
        Ok(DeleteOutcome {
            deleted: u64::from(removed.is_some()),
        })
    }
}

pub fn state() -> AppState<MemoryStore> {
    AppState::new(
        Arc::new(AutomationService::new(MemoryStore::default(), StoreGate::new())),
        QueryService::new(Zone::utc()),
        InProcessRunBus::new(16),
    )
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    use tower::ServiceExt;
    app.clone().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
