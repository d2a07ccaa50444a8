//! Orders as seen by an automation: opaque snapshots, the filters used to
//! select them, and the mutation to apply.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::query::tags::{parse_tag_list, quoted_tags};
use crate::time::Timestamp;

/// An order record exactly as the commerce backend returned it.
///
/// Only the `id` field is ever interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderSnapshot(serde_json::Value);

impl OrderSnapshot {
    #[must_use]
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// The order id as a string, whether the backend sent a number or a
    /// string.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for OrderSnapshot {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// Filters handed to the order-selection collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_min: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at_max: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// What an automation does to each selected order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OrderAction {
    AddTags(Vec<String>),
    RemoveTags(Vec<String>),
    /// Free text that does not describe a supported mutation.
    Unsupported(String),
}

static REMOVE_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:remove|delete|clear|strip)\b").expect("static pattern"));

static ADD_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:add|apply|set|tag)\b").expect("static pattern"));

/// Where an action starts describing the orders: "to orders", "as all
/// pending orders", "from these orders".
const ORDER_CLAUSE: &str =
    r"\b(?:to|on|for|from|as)\s+(?:(?:all|any|each|every|my|the|these|those)\s+)*(?:\w+\s+)?orders?\b";

static ADD_CUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){ORDER_CLAUSE}")).expect("static pattern"));

// "remove tag vip from order 1001": any "from" ends the tag list.
static REMOVE_CUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\bfrom\b|{ORDER_CLAUSE}")).expect("static pattern")
});

impl OrderAction {
    /// Interpret an automation's free-text action.
    ///
    /// Removal verbs win over additive ones. Quoted tags, when present, are
    /// the whole tag list; otherwise bare tags are read up to the clause that
    /// names the orders. An action that names no tags is
    /// [`OrderAction::Unsupported`].
    #[must_use]
    pub fn parse(action: &str) -> Self {
        if REMOVE_TAGS.is_match(action) {
            let tags = requested_tags(action, &REMOVE_CUT);
            if !tags.is_empty() {
                return Self::RemoveTags(tags);
            }
        } else if ADD_TAGS.is_match(action) {
            let tags = requested_tags(action, &ADD_CUT);
            if !tags.is_empty() {
                return Self::AddTags(tags);
            }
        }
        Self::Unsupported(action.trim().to_string())
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

fn requested_tags(action: &str, cut: &Regex) -> Vec<String> {
    let quoted = quoted_tags(action);
    if !quoted.is_empty() {
        return quoted;
    }
    let head = cut.find(action).map_or(action, |m| &action[..m.start()]);
    parse_tag_list(head)
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddTags(tags) => write!(f, "add tags [{}]", tags.join(", ")),
            Self::RemoveTags(tags) => write!(f, "remove tags [{}]", tags.join(", ")),
            Self::Unsupported(text) => write!(f, "unsupported action {text:?}"),
        }
    }
}
