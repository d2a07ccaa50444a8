//! # ordercron-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API for automation CRUD (`/api/automations`)
//! - Expose the query resolvers (`/api/query/range`, `/api/query/tags`,
//!   `/api/query/search`) so callers can preview what a phrase selects
//! - Stream run signals to observers as Server-Sent Events
//!   (`/api/runs/stream`)
//! - Map application errors into HTTP status codes with a JSON body
//!
//! ## Dependency rule
//! Depends on `ordercron-app` (ports and services) and `ordercron-domain`
//! (types used in request/response mapping). Never leaks axum types into
//! the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
