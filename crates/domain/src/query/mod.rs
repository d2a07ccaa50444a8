//! Query resolution: turning free text into exact machine parameters.
//!
//! - [`normalize`] corrects near-miss spellings of time words
//! - [`range`] derives a created-at window from a time phrase
//! - [`tags`] pulls tag tokens out of an action or request
//! - [`search`] combines the above into order [`SearchParameters`](crate::order::SearchParameters)

pub mod normalize;
pub mod range;
pub mod search;
pub mod tags;

pub use normalize::{Normalized, levenshtein, normalize};
pub use range::{DateRange, ExplicitBounds, ResolvedRange, derive_range};
pub use search::{SearchPlan, build_search};
pub use tags::{mentions_tag_keyword, parse_tag_list};
