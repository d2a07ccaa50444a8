//! Query resolution endpoints: preview what a phrase resolves to without
//! touching any automation.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use ordercron_app::ports::AutomationStore;
use ordercron_app::services::query_service::TagExtraction;
use ordercron_domain::order::SearchParameters;
use ordercron_domain::query::ExplicitBounds;
use ordercron_domain::time::{self, Timestamp};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub query: String,
    pub created_at_min: Option<Timestamp>,
    pub created_at_max: Option<Timestamp>,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub created_at_min: Option<Timestamp>,
    pub created_at_max: Option<Timestamp>,
    /// Spelling correction applied while reading the phrase.
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub params: SearchParameters,
    pub warning: Option<String>,
}

/// `POST /api/query/range`
pub async fn range<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<RangeResponse>, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let explicit = ExplicitBounds {
        min: req.created_at_min,
        max: req.created_at_max,
    };
    let resolved = state.query_service.resolve_range(
        &req.query,
        explicit,
        req.timezone.as_deref(),
        time::now(),
    )?;
    Ok(Json(RangeResponse {
        created_at_min: resolved.created_at_min,
        created_at_max: resolved.created_at_max,
        warning: resolved.note,
    }))
}

/// `POST /api/query/tags`
pub async fn tags<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<TagsRequest>,
) -> Json<TagExtraction>
where
    S: AutomationStore + Send + Sync + 'static,
{
    Json(state.query_service.extract_tags(&req.text))
}

/// `POST /api/query/search`
pub async fn search<S>(
    State(state): State<AppState<S>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError>
where
    S: AutomationStore + Send + Sync + 'static,
{
    let plan = state
        .query_service
        .build_search(&req.query, req.timezone.as_deref(), time::now())?;
    Ok(Json(SearchResponse {
        params: plan.params,
        warning: plan.note,
    }))
}
