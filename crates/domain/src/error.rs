//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`OrderCronError`] via `#[from]`.

/// Top-level error shared by every port and service.
#[derive(Debug, thiserror::Error)]
pub enum OrderCronError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("collaborator error")]
    Collaborator(#[from] CollaboratorError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A caller-supplied value breaks a domain invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),

    #[error("interval_days must be between 1 and 36500, got {0}")]
    InvalidInterval(i64),

    #[error("invalid identifier `{0}`")]
    InvalidId(String),

    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),

    #[error("end_at must not be before start_at")]
    InvertedWindow,
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An external collaborator (order selection, mutation, run consumer) failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("order selection failed: {0}")]
    Selection(String),

    #[error("order {order_id} mutation failed: {reason}")]
    Mutation { order_id: String, reason: String },

    #[error("run signal could not be delivered: {0}")]
    Delivery(String),
}
