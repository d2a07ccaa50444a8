//! Search parameter builder: time window plus order status keywords.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::order::SearchParameters;
use crate::query::range::{ExplicitBounds, derive_range};
use crate::time::{Timestamp, Zone};

/// Parameters derived from a search phrase, with the resolver's correction
/// note, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPlan {
    pub params: SearchParameters,
    pub note: Option<String>,
}

/// Phrase → status value, longest phrases first so that `unfulfilled` is not
/// read as `fulfilled`.
const FINANCIAL_KEYWORDS: [(&str, &str); 8] = [
    ("partially refunded", "partially_refunded"),
    ("partially paid", "partially_paid"),
    ("authorized", "authorized"),
    ("refunded", "refunded"),
    ("pending", "pending"),
    ("voided", "voided"),
    ("unpaid", "unpaid"),
    ("paid", "paid"),
];

const FULFILLMENT_KEYWORDS: [(&str, &str); 6] = [
    ("partially fulfilled", "partial"),
    ("unfulfilled", "unfulfilled"),
    ("unshipped", "unshipped"),
    ("fulfilled", "fulfilled"),
    ("shipped", "shipped"),
    ("partial", "partial"),
];

static LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:show|list|find|get|first|last|top)\s+(\d{1,4})\s+(?:[a-z]+\s+)*?orders?\b")
        .expect("static pattern")
});

/// Build order-selection filters from a free-text query.
#[must_use]
pub fn build_search(text: &str, now: Timestamp, zone: &Zone) -> SearchPlan {
    let resolved = derive_range(text, ExplicitBounds::default(), now, zone);
    let lowered = text.to_lowercase();
    let params = SearchParameters {
        created_at_min: resolved.created_at_min,
        created_at_max: resolved.created_at_max,
        financial_status: first_keyword(&lowered, &FINANCIAL_KEYWORDS),
        fulfillment_status: first_keyword(&lowered, &FULFILLMENT_KEYWORDS),
        limit: LIMIT
            .captures(&lowered)
            .and_then(|caps| caps[1].parse().ok())
            .filter(|n| *n > 0),
    };
    SearchPlan {
        params,
        note: resolved.note,
    }
}

fn first_keyword(text: &str, table: &[(&str, &str)]) -> Option<String> {
    table
        .iter()
        .find(|(phrase, _)| contains_phrase(text, phrase))
        .map(|(_, value)| (*value).to_string())
}

/// Whole-word containment: `paid` does not match inside `unpaid`.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(idx, _)| {
        let before = text[..idx].chars().next_back();
        let after = text[idx + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_instant;

    fn plan(text: &str) -> SearchPlan {
        build_search(
            text,
            parse_instant("2025-10-15T12:00:00Z").unwrap(),
            &Zone::utc(),
        )
    }

    #[test]
    fn should_combine_status_and_time_window() {
        let p = plan("show 3 pending orders from yesterday");
        assert_eq!(p.params.financial_status.as_deref(), Some("pending"));
        assert_eq!(p.params.limit, Some(3));
        assert_eq!(
            p.params.created_at_min,
            Some(parse_instant("2025-10-14T00:00:00Z").unwrap())
        );
        assert!(p.note.is_none());
    }

    #[test]
    fn should_not_confuse_unfulfilled_with_fulfilled() {
        let p = plan("unfulfilled orders");
        assert_eq!(p.params.fulfillment_status.as_deref(), Some("unfulfilled"));
        let p = plan("fulfilled orders");
        assert_eq!(p.params.fulfillment_status.as_deref(), Some("fulfilled"));
    }

    #[test]
    fn should_not_confuse_unpaid_with_paid() {
        assert_eq!(
            plan("unpaid orders").params.financial_status.as_deref(),
            Some("unpaid")
        );
        assert_eq!(
            plan("partially paid orders").params.financial_status.as_deref(),
            Some("partially_paid")
        );
    }

    #[test]
    fn should_map_partially_fulfilled_to_partial() {
        assert_eq!(
            plan("partially fulfilled orders last week")
                .params
                .fulfillment_status
                .as_deref(),
            Some("partial")
        );
    }

    #[test]
    fn should_leave_filters_unset_for_plain_text() {
        let p = plan("everything");
        assert_eq!(p.params, SearchParameters::default());
    }

    #[test]
    fn should_carry_correction_note() {
        let p = plan("paid orders from yesterdy");
        assert_eq!(p.params.financial_status.as_deref(), Some("paid"));
        assert!(p.note.is_some());
        assert!(p.params.created_at_max.is_some());
    }

    #[test]
    fn should_read_limit_with_adjectives_between() {
        assert_eq!(plan("list 25 refunded orders").params.limit, Some(25));
        assert_eq!(plan("orders 25").params.limit, None);
    }
}
