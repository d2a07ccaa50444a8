//! Query service: free-text resolution with a configured default zone.

use serde::Serialize;

use ordercron_domain::error::OrderCronError;
use ordercron_domain::query::{
    self, ExplicitBounds, ResolvedRange, SearchPlan, mentions_tag_keyword, parse_tag_list,
};
use ordercron_domain::time::{Timestamp, Zone};

/// Tags read from a request, and whether the caller should be asked again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagExtraction {
    pub tags: Vec<String>,
    /// The text talks about tags but none could be extracted.
    pub needs_clarification: bool,
}

/// Stateless façade over the domain resolvers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryService {
    zone: Zone,
}

impl QueryService {
    #[must_use]
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    #[must_use]
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Resolve a time phrase to a `created_at` window at `now`.
    ///
    /// `timezone` overrides the configured zone for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] when `timezone` is not a known
    /// IANA identifier.
    #[tracing::instrument(skip(self))]
    pub fn resolve_range(
        &self,
        text: &str,
        explicit: ExplicitBounds,
        timezone: Option<&str>,
        now: Timestamp,
    ) -> Result<ResolvedRange, OrderCronError> {
        let zone = self.zone_for(timezone)?;
        let resolved = query::derive_range(text, explicit, now, &zone);
        if let Some(note) = &resolved.note {
            tracing::debug!(%note, "time phrase corrected");
        }
        Ok(resolved)
    }

    /// Build order-selection filters from a search phrase.
    ///
    /// # Errors
    ///
    /// Returns [`OrderCronError::Validation`] when `timezone` is not a known
    /// IANA identifier.
    #[tracing::instrument(skip(self))]
    pub fn build_search(
        &self,
        text: &str,
        timezone: Option<&str>,
        now: Timestamp,
    ) -> Result<SearchPlan, OrderCronError> {
        let zone = self.zone_for(timezone)?;
        Ok(query::build_search(text, now, &zone))
    }

    #[must_use]
    pub fn extract_tags(&self, text: &str) -> TagExtraction {
        let tags = parse_tag_list(text);
        let needs_clarification = tags.is_empty() && mentions_tag_keyword(text);
        TagExtraction {
            tags,
            needs_clarification,
        }
    }

    fn zone_for(&self, timezone: Option<&str>) -> Result<Zone, OrderCronError> {
        match timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
            Some(tz) => Ok(tz.parse::<Zone>()?),
            None => Ok(self.zone),
        }
    }
}
