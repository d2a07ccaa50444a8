//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod automation_store;
pub mod orders;
pub mod run_sink;

pub use automation_store::AutomationStore;
pub use orders::{OrderMutator, OrderSource};
pub use run_sink::RunSignalSink;
