//! Per-record schedule state machine.
//!
//! ```text
//!   enabled=false ──────────────────────────────► Disabled (terminal until updated)
//!   enabled, now > end_at ──► Expired ──persist──► Disabled   (no run)
//!   enabled, now < start_at ─────────────────────► NotStarted (acts as Waiting)
//!   enabled, next_run unset or > now ────────────► Waiting
//!   enabled, next_run <= now ──► Due ──fire──► last_run=now, next_run=now+interval
//! ```

use serde::Serialize;

use crate::automation::{AutomationPatch, AutomationRecord};
use crate::error::{OrderCronError, ValidationError};
use crate::time::{Timestamp, add_days};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleState {
    Disabled,
    NotStarted,
    Waiting,
    Due,
    Expired,
}

/// What the scheduler should do with a record on this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Nothing to persist.
    Idle(ScheduleState),
    /// Persist the patch without emitting a run.
    Expire(AutomationPatch),
    /// Emit a run, then persist the patch.
    Fire(AutomationPatch),
}

impl AutomationRecord {
    /// Classify the record at `now`.
    ///
    /// Expiry is checked before due-ness, so a record that is both past
    /// `end_at` and past `next_run` expires without firing.
    #[must_use]
    pub fn schedule_state(&self, now: Timestamp) -> ScheduleState {
        if !self.enabled {
            return ScheduleState::Disabled;
        }
        if self.end_at.is_some_and(|end| now > end) {
            return ScheduleState::Expired;
        }
        if self.start_at.is_some_and(|start| now < start) {
            return ScheduleState::NotStarted;
        }
        match self.next_run {
            Some(next) if next <= now => ScheduleState::Due,
            _ => ScheduleState::Waiting,
        }
    }

    /// # Errors
    ///
    /// Fails when the record is due but its next run falls outside the
    /// representable calendar.
    pub fn decide(&self, now: Timestamp) -> Result<Decision, OrderCronError> {
        Ok(match self.schedule_state(now) {
            ScheduleState::Expired => Decision::Expire(AutomationPatch::default().enabled(false)),
            ScheduleState::Due => Decision::Fire(self.advance_after_fire(now)?),
            state => Decision::Idle(state),
        })
    }

    /// `last_run = now`, `next_run = now + interval_days`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidInterval`] when the addition
    /// overflows.
    pub fn advance_after_fire(&self, now: Timestamp) -> Result<AutomationPatch, OrderCronError> {
        let next = add_days(now, self.interval_days)
            .ok_or(ValidationError::InvalidInterval(i64::from(self.interval_days)))?;
        Ok(AutomationPatch::default()
            .last_run(Some(now))
            .next_run(Some(next)))
    }
}
