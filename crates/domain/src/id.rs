//! Typed identifier newtypes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Store-assigned identifier of an [`AutomationRecord`](crate::automation::AutomationRecord).
///
/// Only the store mints these; the domain never invents one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationId(i64);

impl AutomationId {
    /// Wrap a raw store key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidId`] when `raw` is not positive.
    pub fn new(raw: i64) -> Result<Self, ValidationError> {
        if raw <= 0 {
            return Err(ValidationError::InvalidId(raw.to_string()));
        }
        Ok(Self(raw))
    }

    /// Access the raw store key.
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AutomationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AutomationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidId(s.to_string()))?;
        Self::new(raw)
    }
}

/// Unique identifier of one emitted [`RunSignal`](crate::run::RunSignal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(uuid::Uuid);

impl Default for RunId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl RunId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
