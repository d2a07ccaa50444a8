//! In-memory demo order book.
//!
//! Stands in for a commerce backend when running `ordercrond` locally: it
//! holds a small set of seeded orders and implements both
//! [`OrderSource`] and [`OrderMutator`], so automations can select and tag
//! orders end to end without any network access.
//!
//! | Order | Financial status | Fulfillment | Age at seeding |
//! |-------|------------------|-------------|----------------|
//! | #1001 | pending          | unshipped   | 2 hours        |
//! | #1002 | paid             | unshipped   | 5 hours        |
//! | #1003 | paid             | fulfilled   | 20 hours       |
//! | #1004 | authorized       | unshipped   | 30 hours       |
//! | #1005 | pending          | unshipped   | 52 hours       |
//! | #1006 | refunded         | fulfilled   | 75 hours       |
//! | #1007 | partially_paid   | partial     | 150 hours      |
//! | #1008 | paid             | fulfilled   | 400 hours      |
//! | #1009 | voided           | unshipped   | 900 hours      |
//! | #1010 | paid             | fulfilled   | 4000 hours     |

mod order;
mod seed;

use std::sync::{Mutex, MutexGuard, PoisonError};

use ordercron_app::ports::{OrderMutator, OrderSource};
use ordercron_domain::error::{CollaboratorError, NotFoundError, OrderCronError};
use ordercron_domain::order::{OrderAction, OrderSnapshot, SearchParameters};
use ordercron_domain::time::Timestamp;

pub use order::DemoOrder;

/// A mutable set of orders shared by selection and mutation.
pub struct DemoOrderBook {
    orders: Mutex<Vec<DemoOrder>>,
}

impl DemoOrderBook {
    #[must_use]
    pub fn new(orders: Vec<DemoOrder>) -> Self {
        Self {
            orders: Mutex::new(orders),
        }
    }

    /// A book holding the ten demo orders, dated relative to `now`.
    #[must_use]
    pub fn seeded(now: Timestamp) -> Self {
        Self::new(seed::orders(now))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// A copy of the order with the given id, if any.
    #[must_use]
    pub fn order(&self, id: u64) -> Option<DemoOrder> {
        self.lock().iter().find(|o| o.id == id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DemoOrder>> {
        self.orders.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OrderSource for DemoOrderBook {
    /// Matching orders, newest first, truncated to `params.limit`.
    async fn select(&self, params: &SearchParameters) -> Result<Vec<OrderSnapshot>, OrderCronError> {
        let mut matching: Vec<DemoOrder> = self
            .lock()
            .iter()
            .filter(|o| o.matches(params))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        if let Some(limit) = params.limit {
            matching.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        tracing::debug!(selected = matching.len(), ?params, "demo orders selected");
        Ok(matching.iter().map(DemoOrder::snapshot).collect())
    }
}

impl OrderMutator for DemoOrderBook {
    async fn apply(&self, order_id: &str, action: &OrderAction) -> Result<(), OrderCronError> {
        let not_found = || NotFoundError {
            entity: "Order",
            id: order_id.to_string(),
        };
        let id: u64 = order_id.parse().map_err(|_| not_found())?;

        let mut orders = self.lock();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(not_found)?;

        match action {
            OrderAction::AddTags(tags) => {
                let added = order.add_tags(tags);
                tracing::info!(%order_id, added, "tags added");
            }
            OrderAction::RemoveTags(tags) => {
                let removed = order.remove_tags(tags);
                tracing::info!(%order_id, removed, "tags removed");
            }
            OrderAction::Unsupported(text) => {
                return Err(CollaboratorError::Mutation {
                    order_id: order_id.to_string(),
                    reason: format!("unsupported action `{text}`"),
                }
                .into());
            }
        }
        Ok(())
    }
}
