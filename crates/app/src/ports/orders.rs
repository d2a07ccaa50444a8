//! Order collaborator ports: selection and mutation against the commerce
//! backend.

use std::future::Future;
use std::sync::Arc;

use ordercron_domain::error::OrderCronError;
use ordercron_domain::order::{OrderAction, OrderSnapshot, SearchParameters};

/// Selects orders matching a set of filters.
pub trait OrderSource {
    fn select(
        &self,
        params: &SearchParameters,
    ) -> impl Future<Output = Result<Vec<OrderSnapshot>, OrderCronError>> + Send;
}

/// Applies an [`OrderAction`] to a single order. Callers do not retry.
pub trait OrderMutator {
    fn apply(
        &self,
        order_id: &str,
        action: &OrderAction,
    ) -> impl Future<Output = Result<(), OrderCronError>> + Send;
}

impl<T: OrderSource + Send + Sync> OrderSource for Arc<T> {
    fn select(
        &self,
        params: &SearchParameters,
    ) -> impl Future<Output = Result<Vec<OrderSnapshot>, OrderCronError>> + Send {
        (**self).select(params)
    }
}

impl<T: OrderMutator + Send + Sync> OrderMutator for Arc<T> {
    fn apply(
        &self,
        order_id: &str,
        action: &OrderAction,
    ) -> impl Future<Output = Result<(), OrderCronError>> + Send {
        (**self).apply(order_id, action)
    }
}
