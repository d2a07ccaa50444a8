//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod automations;
#[allow(clippy::missing_errors_doc)]
pub mod query;
pub mod runs;

use axum::Router;
use axum::routing::{get, post};

use ordercron_app::ports::AutomationStore;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S>() -> Router<AppState<S>>
where
    S: AutomationStore + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/automations",
            get(automations::list::<S>).post(automations::create::<S>),
        )
        .route(
            "/automations/{id}",
            get(automations::get::<S>)
                .patch(automations::update::<S>)
                .delete(automations::delete::<S>),
        )
        .route("/query/range", post(query::range::<S>))
        .route("/query/tags", post(query::tags::<S>))
        .route("/query/search", post(query::search::<S>))
        .route("/runs/stream", get(runs::stream::<S>))
}
