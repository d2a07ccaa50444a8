//! Temporal range resolver: derive a `created_at` window from a time phrase.
//!
//! Matchers are evaluated in a fixed priority order and the first one that
//! yields a range wins. Each matcher is a plain function returning
//! `Option<DateRange>` so the priority contract can be tested in isolation.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, TimeDelta};
use regex::Regex;
use serde::Serialize;

use crate::query::normalize::normalize;
use crate::time::{DayClock, Timestamp, Zone};

/// An inclusive `[start, end]` window, both ends at millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateRange {
    /// Length of the window.
    #[must_use]
    pub fn span(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Bounds the caller already knows; either one being set disables inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplicitBounds {
    pub min: Option<Timestamp>,
    pub max: Option<Timestamp>,
}

/// Outcome of [`derive_range`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedRange {
    pub created_at_min: Option<Timestamp>,
    pub created_at_max: Option<Timestamp>,
    /// First spelling correction applied while reading the phrase.
    pub note: Option<String>,
}

impl ResolvedRange {
    /// Both ends, when both are known.
    #[must_use]
    pub fn range(&self) -> Option<DateRange> {
        Some(DateRange {
            start: self.created_at_min?,
            end: self.created_at_max?,
        })
    }

    /// `true` when no time filter applies.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.created_at_min.is_none() && self.created_at_max.is_none()
    }
}

/// Derive the window described by `query`, as seen at `now` in `zone`.
///
/// Explicit bounds pass through untouched. A "no filter" phrase always
/// yields an unbounded result. Otherwise the first matching rule wins and
/// the absence of any time cue means "do not filter by time".
#[must_use]
pub fn derive_range(
    query: &str,
    explicit: ExplicitBounds,
    now: Timestamp,
    zone: &Zone,
) -> ResolvedRange {
    if explicit.min.is_some() || explicit.max.is_some() {
        return ResolvedRange {
            created_at_min: explicit.min,
            created_at_max: explicit.max,
            note: None,
        };
    }

    let normalized = normalize(query);
    let raw = query.to_lowercase();
    if NO_FILTER.is_match(&raw) {
        return ResolvedRange {
            note: normalized.note,
            ..ResolvedRange::default()
        };
    }

    let cues = Cues::new(&raw, &normalized.text);
    let ctx = Context::new(now, zone);
    let range = MATCHERS.iter().find_map(|(_, matcher)| matcher(&cues, &ctx));

    ResolvedRange {
        created_at_min: range.map(|r| r.start),
        created_at_max: range.map(|r| r.end),
        note: normalized.note,
    }
}

/// The three views of the query that matchers inspect.
struct Cues<'a> {
    /// Lower-cased original text; month names are read from here.
    raw: &'a str,
    /// Normalizer output.
    text: &'a str,
    /// Normalizer output with every non-letter removed ("last week" → "lastweek").
    compact: String,
}

impl<'a> Cues<'a> {
    fn new(raw: &'a str, text: &'a str) -> Self {
        let compact = text.chars().filter(char::is_ascii_lowercase).collect();
        Self { raw, text, compact }
    }

    fn has(&self, needle: &str) -> bool {
        self.text.contains(needle) || self.compact.contains(needle)
    }
}

struct Context {
    clock: DayClock,
    today: NaiveDate,
}

impl Context {
    fn new(now: Timestamp, zone: &Zone) -> Self {
        let clock = zone.clock_at(now);
        let today = clock.date_of(now);
        Self { clock, today }
    }

    fn day(&self, date: NaiveDate) -> DateRange {
        self.days(date, date)
    }

    fn days(&self, first: NaiveDate, last: NaiveDate) -> DateRange {
        DateRange {
            start: self.clock.start_of_day(first),
            end: self.clock.end_of_day(last),
        }
    }

    fn month(&self, year: i32, month: u32) -> Option<DateRange> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = first.checked_add_months(chrono::Months::new(1))?.pred_opt()?;
        Some(self.days(first, last))
    }

    /// Start of the day `n` days ago through the end of today.
    fn trailing_days(&self, n: u64) -> Option<DateRange> {
        let first = self.today.checked_sub_days(Days::new(n))?;
        Some(self.days(first, self.today))
    }
}

type Matcher = fn(&Cues<'_>, &Context) -> Option<DateRange>;

/// Priority order; the first `Some` wins.
const MATCHERS: [(&str, Matcher); 10] = [
    ("explicit_date", explicit_date),
    ("month_name", month_name),
    ("weekday", weekday),
    ("last_year", last_year),
    ("past_year", past_year),
    ("last_month", last_month),
    ("past_month", past_month),
    ("past_week", past_week),
    ("yesterday", yesterday),
    ("today", today),
];

static NO_FILTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:all orders|any ?time|no filters?|all time)\b").expect("static pattern")
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("static pattern"));

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").expect("static pattern")
});

static MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:(in|from|during)\s+)?([a-z]+)\b(?:\s+(\d{4})\b)?").expect("static pattern")
});

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:(last|this)\s+)?(sunday|monday|tuesday|wednesday|thursday|friday|saturday)\b",
    )
    .expect("static pattern")
});

static TRAILING_30_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:past|last)\s+30\s+days\b").expect("static pattern"));

static TRAILING_7_DAYS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:past|last)\s+7\s+days\b").expect("static pattern"));

static YESTERDAY_ISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\byesterd[a-z]*\b").expect("static pattern"));

const WEEKDAYS: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// 1-based month number for a full name or a standard abbreviation.
fn month_number(word: &str) -> Option<u32> {
    let index = MONTHS.iter().position(|name| {
        *name == word || (word.len() == 3 && name.starts_with(word)) || (word == "sept" && *name == "september")
    })?;
    u32::try_from(index + 1).ok()
}

fn explicit_date(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    let iso = ISO_DATE.captures_iter(cues.raw).find_map(|caps| {
        NaiveDate::from_ymd_opt(
            caps[1].parse().ok()?,
            caps[2].parse().ok()?,
            caps[3].parse().ok()?,
        )
    });
    let date = iso.or_else(|| {
        MONTH_DAY_YEAR.captures_iter(cues.raw).find_map(|caps| {
            let month = month_number(&caps[1])?;
            NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[2].parse().ok()?)
        })
    })?;
    Some(ctx.day(date))
}

fn month_name(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    let (month, year) = MONTH_YEAR.captures_iter(cues.raw).find_map(|caps| {
        let word = &caps[2];
        let year = caps.get(3).and_then(|y| y.as_str().parse::<i32>().ok());
        // Bare "may" is the verb.
        if word == "may" && caps.get(1).is_none() && year.is_none() {
            return None;
        }
        Some((month_number(word)?, year))
    })?;
    let year = year.unwrap_or_else(|| {
        // "in September" said in October means the most recent September.
        if month > ctx.today.month() {
            ctx.today.year() - 1
        } else {
            ctx.today.year()
        }
    });
    ctx.month(year, month)
}

fn weekday(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    let caps = WEEKDAY.captures(cues.text)?;
    let last = caps.get(1).is_some_and(|m| m.as_str() == "last");
    let target = WEEKDAYS.iter().position(|d| *d == &caps[2])?;
    let current = usize::try_from(ctx.today.weekday().num_days_from_sunday()).ok()?;
    let mut back = (current + 7 - target) % 7;
    if last && back == 0 {
        back = 7;
    }
    let date = ctx.today.checked_sub_days(Days::new(u64::try_from(back).ok()?))?;
    Some(ctx.day(date))
}

fn last_year(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("lastyear") {
        return None;
    }
    let year = ctx.today.year() - 1;
    Some(ctx.days(
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

fn past_year(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("pastyear") {
        return None;
    }
    ctx.trailing_days(365)
}

fn last_month(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("lastmonth") {
        return None;
    }
    let previous = ctx
        .today
        .with_day(1)?
        .checked_sub_months(chrono::Months::new(1))?;
    ctx.month(previous.year(), previous.month())
}

fn past_month(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("pastmonth") && !TRAILING_30_DAYS.is_match(cues.text) {
        return None;
    }
    ctx.trailing_days(30)
}

fn past_week(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("lastweek") && !cues.has("pastweek") && !TRAILING_7_DAYS.is_match(cues.text) {
        return None;
    }
    ctx.trailing_days(7)
}

fn yesterday(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.text.contains("yesterday") && !YESTERDAY_ISH.is_match(cues.text) {
        return None;
    }
    Some(ctx.day(ctx.today.pred_opt()?))
}

fn today(cues: &Cues<'_>, ctx: &Context) -> Option<DateRange> {
    if !cues.has("today") {
        return None;
    }
    Some(ctx.day(ctx.today))
}
