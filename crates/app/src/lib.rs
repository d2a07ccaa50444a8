//! # ordercron-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `AutomationStore`: persisted CRUD for automation records
//!   - `OrderSource`: order selection by search parameters
//!   - `OrderMutator`: apply a parsed action to one order
//!   - `RunSignalSink`: receive run signals when a record fires
//! - Define **driving/inbound** use-cases:
//!   - `AutomationService`: validated save/update/list/get/delete
//!   - `QueryService`: range, tag, and search resolution in a default zone
//!   - `Scheduler`: the periodic due-detection loop
//!   - `Executor`: turns run signals into order mutations
//! - Provide **in-process infrastructure** that needs no IO: the run bus and
//!   the store gate serializing writes
//!
//! ## Dependency rule
//! Depends on `ordercron-domain` only (plus `tokio` for channels, locks and
//! timers). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod executor;
pub mod gate;
pub mod ports;
pub mod run_bus;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod fakes;
