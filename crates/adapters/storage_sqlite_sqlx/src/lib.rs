//! # ordercron-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `AutomationStore` port defined in `ordercron-app::ports`
//! - Manage the `SQLite` connection pool lifecycle (open, migrate, close)
//! - Map between domain records and rows: instants as RFC 3339 text with
//!   millisecond precision, the order snapshot as JSON text
//!
//! ## Dependency rule
//! Depends on `ordercron-app` (for port traits) and `ordercron-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

mod automation_store;
mod error;
mod pool;

pub use automation_store::SqliteAutomationStore;
pub use error::StorageError;
pub use pool::{Config, Database};
