//! A single demo order and the filter semantics the book applies to it.

use serde_json::json;

use ordercron_domain::order::{OrderSnapshot, SearchParameters};
use ordercron_domain::time::{Timestamp, format_instant};

/// An order held by the [`DemoOrderBook`](crate::DemoOrderBook).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOrder {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub financial_status: String,
    /// `None` means nothing has shipped yet.
    pub fulfillment_status: Option<String>,
    pub tags: Vec<String>,
}

impl DemoOrder {
    /// Render the order the way a commerce backend would, tags joined into a
    /// single comma separated string.
    #[must_use]
    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot::new(json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "created_at": format_instant(self.created_at),
            "financial_status": self.financial_status,
            "fulfillment_status": self.fulfillment_status,
            "tags": self.tags.join(", "),
        }))
    }

    /// Whether every filter present in `params` accepts this order.
    /// `limit` is not a per-order filter and is ignored here.
    #[must_use]
    pub fn matches(&self, params: &SearchParameters) -> bool {
        params.created_at_min.is_none_or(|min| self.created_at >= min)
            && params.created_at_max.is_none_or(|max| self.created_at <= max)
            && params
                .financial_status
                .as_deref()
                .is_none_or(|status| self.financial_status == status)
            && params
                .fulfillment_status
                .as_deref()
                .is_none_or(|status| self.fulfilled_as(status))
    }

    fn fulfilled_as(&self, filter: &str) -> bool {
        let current = self.fulfillment_status.as_deref();
        match filter {
            "unfulfilled" | "unshipped" => matches!(current, None | Some("unfulfilled")),
            "fulfilled" | "shipped" => current == Some("fulfilled"),
            other => current == Some(other),
        }
    }

    /// Add the tags not already present. Returns how many were added.
    pub fn add_tags(&mut self, tags: &[String]) -> usize {
        let mut added = 0;
        for tag in tags {
            if !self.has_tag(tag) {
                self.tags.push(tag.clone());
                added += 1;
            }
        }
        added
    }

    /// Drop every listed tag. Returns how many were removed.
    pub fn remove_tags(&mut self, tags: &[String]) -> usize {
        let before = self.tags.len();
        self.tags
            .retain(|existing| !tags.iter().any(|tag| tag.eq_ignore_ascii_case(existing)));
        before - self.tags.len()
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing.eq_ignore_ascii_case(tag))
    }
}
