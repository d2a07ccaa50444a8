//! Automation: a persisted recurring job: selection criteria, an action, and
//! a cadence.
//!
//! Three shapes describe the same thing at different moments:
//! - [`NewAutomation`] is what a caller hands to the store on save,
//! - [`AutomationRecord`] is the fully materialized, store-owned record,
//! - [`AutomationPatch`] carries only the fields a partial update touches.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{OrderCronError, ValidationError};
use crate::id::AutomationId;
use crate::order::OrderSnapshot;
use crate::time::Timestamp;

/// Label used when a caller saves an automation without naming it.
pub const DEFAULT_LABEL: &str = "Automation";

/// Cadence used when a caller does not specify one.
pub const DEFAULT_INTERVAL_DAYS: u32 = 1;

/// Longest accepted cadence, roughly a century.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// A persisted recurring job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRecord {
    pub id: AutomationId,
    pub label: String,
    /// Free-text cadence; informational, `interval_days` is authoritative.
    pub schedule: String,
    pub action: String,
    pub search_query: String,
    pub orders_snapshot: Vec<OrderSnapshot>,
    pub created_at: Timestamp,
    pub last_run: Option<Timestamp>,
    pub next_run: Option<Timestamp>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub enabled: bool,
    pub interval_days: u32,
}

/// A validated request to create an automation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAutomation {
    pub label: String,
    pub schedule: String,
    pub action: String,
    pub search_query: String,
    pub orders_snapshot: Vec<OrderSnapshot>,
    pub last_run: Option<Timestamp>,
    pub next_run: Option<Timestamp>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub enabled: bool,
    pub interval_days: u32,
}

impl NewAutomation {
    /// Create a builder for constructing a [`NewAutomation`].
    #[must_use]
    pub fn builder() -> NewAutomationBuilder {
        NewAutomationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] when:
    /// - `schedule` or `action` is blank ([`ValidationError::MissingField`])
    /// - `interval_days` is zero or above [`MAX_INTERVAL_DAYS`]
    ///   ([`ValidationError::InvalidInterval`])
    /// - `end_at` precedes `start_at` ([`ValidationError::InvertedWindow`])
    pub fn validate(&self) -> Result<(), OrderCronError> {
        if self.schedule.trim().is_empty() {
            return Err(ValidationError::MissingField("schedule").into());
        }
        if self.action.trim().is_empty() {
            return Err(ValidationError::MissingField("action").into());
        }
        check_interval(self.interval_days)?;
        check_window(self.start_at, self.end_at)?;
        Ok(())
    }

    /// Materialize the record the store returns once it has assigned `id`
    /// and `created_at`.
    #[must_use]
    pub fn into_record(self, id: AutomationId, created_at: Timestamp) -> AutomationRecord {
        AutomationRecord {
            id,
            label: self.label,
            schedule: self.schedule,
            action: self.action,
            search_query: self.search_query,
            orders_snapshot: self.orders_snapshot,
            created_at,
            last_run: self.last_run,
            next_run: self.next_run,
            start_at: self.start_at,
            end_at: self.end_at,
            enabled: self.enabled,
            interval_days: self.interval_days,
        }
    }
}

fn check_window(start_at: Option<Timestamp>, end_at: Option<Timestamp>) -> Result<(), ValidationError> {
    match (start_at, end_at) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::InvertedWindow),
        _ => Ok(()),
    }
}

fn check_interval(days: u32) -> Result<(), ValidationError> {
    if (1..=MAX_INTERVAL_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(ValidationError::InvalidInterval(i64::from(days)))
    }
}

/// Step-by-step builder for [`NewAutomation`].
#[derive(Debug, Default)]
pub struct NewAutomationBuilder {
    label: Option<String>,
    schedule: Option<String>,
    action: Option<String>,
    search_query: Option<String>,
    orders_snapshot: Vec<OrderSnapshot>,
    last_run: Option<Timestamp>,
    next_run: Option<Timestamp>,
    start_at: Option<Timestamp>,
    end_at: Option<Timestamp>,
    enabled: Option<bool>,
    interval_days: Option<u32>,
}

impl NewAutomationBuilder {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[must_use]
    pub fn search_query(mut self, search_query: impl Into<String>) -> Self {
        self.search_query = Some(search_query.into());
        self
    }

    #[must_use]
    pub fn orders_snapshot(mut self, orders: Vec<OrderSnapshot>) -> Self {
        self.orders_snapshot = orders;
        self
    }

    #[must_use]
    pub fn last_run(mut self, ts: Timestamp) -> Self {
        self.last_run = Some(ts);
        self
    }

    #[must_use]
    pub fn next_run(mut self, ts: Timestamp) -> Self {
        self.next_run = Some(ts);
        self
    }

    #[must_use]
    pub fn start_at(mut self, ts: Timestamp) -> Self {
        self.start_at = Some(ts);
        self
    }

    #[must_use]
    pub fn end_at(mut self, ts: Timestamp) -> Self {
        self.end_at = Some(ts);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn interval_days(mut self, days: u32) -> Self {
        self.interval_days = Some(days);
        self
    }

    /// Consume the builder, apply defaults, validate, and return a
    /// [`NewAutomation`].
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] if required fields are missing
    /// or an invariant fails.
    pub fn build(self) -> Result<NewAutomation, OrderCronError> {
        let label = self
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LABEL.to_string());
        let automation = NewAutomation {
            label,
            schedule: self.schedule.unwrap_or_default(),
            action: self.action.unwrap_or_default(),
            search_query: self.search_query.unwrap_or_default(),
            orders_snapshot: self.orders_snapshot,
            last_run: self.last_run,
            next_run: self.next_run,
            start_at: self.start_at,
            end_at: self.end_at,
            enabled: self.enabled.unwrap_or(true),
            interval_days: self.interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS),
        };
        automation.validate()?;
        Ok(automation)
    }
}

/// Result of deleting by id; `deleted` is `0` when the id was unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// A partial update: `None` means "leave untouched".
///
/// Nullable timestamps use `Option<Option<_>>` so a caller can distinguish
/// "do not touch `end_at`" from "clear `end_at`".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutomationPatch {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub orders_snapshot: Option<Vec<OrderSnapshot>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_run: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "double_option")]
    pub next_run: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "double_option")]
    pub start_at: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_at: Option<Option<Timestamp>>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub interval_days: Option<u32>,
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl AutomationPatch {
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn search_query(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    #[must_use]
    pub fn orders_snapshot(mut self, orders: Vec<OrderSnapshot>) -> Self {
        self.orders_snapshot = Some(orders);
        self
    }

    #[must_use]
    pub fn last_run(mut self, ts: Option<Timestamp>) -> Self {
        self.last_run = Some(ts);
        self
    }

    #[must_use]
    pub fn next_run(mut self, ts: Option<Timestamp>) -> Self {
        self.next_run = Some(ts);
        self
    }

    #[must_use]
    pub fn end_at(mut self, ts: Option<Timestamp>) -> Self {
        self.end_at = Some(ts);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn interval_days(mut self, days: u32) -> Self {
        self.interval_days = Some(days);
        self
    }

    /// `true` when no field is supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check the supplied fields against domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] when a supplied `schedule` or
    /// `action` is blank, or a supplied `interval_days` is out of range.
    pub fn validate(&self) -> Result<(), OrderCronError> {
        if self.schedule.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::MissingField("schedule").into());
        }
        if self.action.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(ValidationError::MissingField("action").into());
        }
        if let Some(days) = self.interval_days {
            check_interval(days)?;
        }
        if let (Some(start), Some(end)) = (self.start_at, self.end_at) {
            check_window(start, end)?;
        }
        Ok(())
    }

    /// Apply the supplied fields to `record`, leaving the rest untouched.
    ///
    /// `id` and `created_at` are never modified.
    pub fn apply_to(&self, record: &mut AutomationRecord) {
        if let Some(label) = &self.label {
            record.label.clone_from(label);
        }
        if let Some(schedule) = &self.schedule {
            record.schedule.clone_from(schedule);
        }
        if let Some(action) = &self.action {
            record.action.clone_from(action);
        }
        if let Some(query) = &self.search_query {
            record.search_query.clone_from(query);
        }
        if let Some(orders) = &self.orders_snapshot {
            record.orders_snapshot.clone_from(orders);
        }
        if let Some(ts) = self.last_run {
            record.last_run = ts;
        }
        if let Some(ts) = self.next_run {
            record.next_run = ts;
        }
        if let Some(ts) = self.start_at {
            record.start_at = ts;
        }
        if let Some(ts) = self.end_at {
            record.end_at = ts;
        }
        if let Some(enabled) = self.enabled {
            record.enabled = enabled;
        }
        if let Some(days) = self.interval_days {
            record.interval_days = days;
        }
    }
}
