//! Run signal sink port: where the scheduler announces fired records.

use std::future::Future;
use std::sync::Arc;

use ordercron_domain::error::OrderCronError;
use ordercron_domain::run::RunSignal;

/// Receives one [`RunSignal`] per due record per tick.
pub trait RunSignalSink {
    fn emit(&self, signal: RunSignal) -> impl Future<Output = Result<(), OrderCronError>> + Send;
}

impl<T: RunSignalSink + Send + Sync> RunSignalSink for Arc<T> {
    fn emit(&self, signal: RunSignal) -> impl Future<Output = Result<(), OrderCronError>> + Send {
        (**self).emit(signal)
    }
}
