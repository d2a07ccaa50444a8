//! JSON handlers for automation records.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use ordercron_app::ports::AutomationStore;
use ordercron_domain::automation::{
    AutomationPatch, AutomationRecord, DeleteOutcome, NewAutomation,
};
use ordercron_domain::error::{NotFoundError, OrderCronError};
use ordercron_domain::id::AutomationId;
use ordercron_domain::order::OrderSnapshot;
use ordercron_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating an automation. Omitted fields take the record
/// defaults.
#[derive(Debug, Deserialize)]
pub struct CreateAutomationRequest {
    pub label: Option<String>,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub search_query: String,
    #[serde(default)]
    pub orders_snapshot: Vec<OrderSnapshot>,
    pub next_run: Option<Timestamp>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub enabled: Option<bool>,
    pub interval_days: Option<u32>,
}

impl CreateAutomationRequest {
    fn into_automation(self) -> Result<NewAutomation, OrderCronError> {
        let mut builder = NewAutomation::builder()
            .schedule(self.schedule)
            .action(self.action)
            .search_query(self.search_query)
            .orders_snapshot(self.orders_snapshot);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        if let Some(ts) = self.next_run {
            builder = builder.next_run(ts);
        }
        if let Some(ts) = self.start_at {
            builder = builder.start_at(ts);
        }
        if let Some(ts) = self.end_at {
            builder = builder.end_at(ts);
        }
        if let Some(enabled) = self.enabled {
            builder = builder.enabled(enabled);
        }
        if let Some(days) = self.interval_days {
            builder = builder.interval_days(days);
        }
        builder.build()
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<AutomationRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<AutomationRecord>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<AutomationRecord>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/automations`: all records, newest first.
pub async fn list<S>(State(state): State<AppState<S>>) -> Result<ListResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let records = state.automation_service.list().await?;
    Ok(ListResponse::Ok(Json(records)))
}

/// `GET /api/automations/{id}`
pub async fn get<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let id: AutomationId = id.parse()?;
    let record = state.automation_service.get(id).await?;
    Ok(GetResponse::Ok(Json(record)))
}

/// `POST /api/automations`
pub async fn create<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<CreateAutomationRequest>,
) -> Result<CreateResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let automation = req.into_automation()?;
    let record = state.automation_service.save(automation).await?;
    Ok(CreateResponse::Created(Json(record)))
}

/// `PATCH /api/automations/{id}`: partial update; an empty body or an
/// unknown id is a 404.
pub async fn update<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    Json(patch): Json<AutomationPatch>,
) -> Result<GetResponse, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let id: AutomationId = id.parse()?;
    let updated = state.automation_service.update(id, patch).await?;
    if updated.is_none() {
        return Err(OrderCronError::from(NotFoundError {
            entity: "Automation",
            id: id.to_string(),
        })
        .into());
    }
    let record = state.automation_service.get(id).await?;
    Ok(GetResponse::Ok(Json(record)))
}

/// `DELETE /api/automations/{id}`: `{ "deleted": 0 | 1 }`.
pub async fn delete<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let id: AutomationId = id.parse()?;
    let outcome = state.automation_service.delete(id).await?;
    Ok(Json(outcome))
}
