//! # ordercron-domain
//!
//! Pure domain model for the ordercron recurring order-maintenance system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Automation records** (criteria + action + cadence) and the
//!   partial-update shape used by the store
//! - Define the per-record **schedule state machine** (disabled, waiting,
//!   due, expired) and the advance-after-fire rule
//! - Turn free text into machine parameters: the **lexical normalizer**, the
//!   **temporal range resolver**, and the **tag list extractor**
//! - Define the **orders** vocabulary shared with external collaborators
//!   (opaque snapshots, search parameters, parsed actions, run signals)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod automation;
pub mod order;
pub mod query;
pub mod run;
pub mod schedule;
