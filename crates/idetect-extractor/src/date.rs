//! Event dates
//!
//! Resolves date phrases ("last week", "December 25", "two days ago") to
//! calendar dates anchored on the article's publication date. Articles
//! report past events, so a phrase that resolves into the future is rolled
//! back, and dates implausibly far before publication are dropped.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveTime, Utc, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

const MONTHS: &str = "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|september|sept|sep|october|oct|november|nov|december|dec";
const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const COUNT_WORDS: &str = r"a|an|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|\d+";

static CONTAINS_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new("jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec").expect("valid regex")
});
static ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(st|nd|rd|th)\b").expect("valid regex"));
static AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^({})\s+(day|week|month|year)s?\s+ago$",
        COUNT_WORDS
    ))
    .expect("valid regex")
});
static RELATIVE_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(last|past|previous|next|this)\s+(day|week|weekend|month|year)$")
        .expect("valid regex")
});
static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:(last|past|previous|next|this|on)\s+)?({})$", WEEKDAYS))
        .expect("valid regex")
});
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({})\.?\s+(\d{{1,2}})(?:\s+(\d{{4}}))?$", MONTHS)).expect("valid regex")
});
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(\d{{1,2}})\s+(?:of\s+)?({})\.?(?:\s+(\d{{4}}))?$", MONTHS))
        .expect("valid regex")
});
static MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:(?:early|mid|late)\s+)?({})\.?(?:\s+(\d{{4}}))?$", MONTHS))
        .expect("valid regex")
});

/// Resolves date phrases against publication dates
#[derive(Debug, Clone, Copy)]
pub struct DateResolver {
    /// Dates more than this many days before publication are dropped
    max_age_days: i64,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self { max_age_days: 366 }
    }
}

impl DateResolver {
    pub fn new(max_age_days: i64) -> Self {
        Self { max_age_days }
    }

    /// Resolve a phrase to an absolute date.
    ///
    /// Without a publication date the phrase is anchored on today and no
    /// rollback happens. A result after publication is rolled back: one
    /// year if the phrase names a month, otherwise by the whole weeks and
    /// leftover days it overshot.
    pub fn absolute_date(&self, phrase: &str, publication: Option<NaiveDate>) -> Option<NaiveDate> {
        let anchor = publication.unwrap_or_else(|| Utc::now().date_naive());
        let parsed = resolve_phrase(phrase, anchor)?;

        let Some(publication) = publication else {
            return Some(parsed);
        };
        if parsed <= publication {
            return Some(parsed);
        }

        if CONTAINS_MONTH.is_match(&phrase.to_lowercase()) {
            NaiveDate::from_ymd_opt(parsed.year() - 1, parsed.month(), parsed.day())
        } else {
            let days = (parsed - publication).num_days();
            let weeks = days / 7;
            let after = if days % 7 == 0 { 7 } else { days % 7 };
            publication
                .checked_sub_days(Days::new((weeks * 7) as u64))?
                .checked_sub_days(Days::new((7 - after) as u64))
        }
    }

    /// A date is plausible when it is not after publication and not too
    /// far before it
    pub fn is_likely(&self, date: NaiveDate, publication: Option<NaiveDate>) -> bool {
        match publication {
            Some(publication) => {
                date <= publication && (publication - date).num_days() <= self.max_age_days
            }
            None => true,
        }
    }

    /// Resolve and filter a sequence of date phrases
    pub fn resolve_all<'a, I>(&self, phrases: I, publication: Option<NaiveDate>) -> Vec<NaiveDate>
    where
        I: IntoIterator<Item = &'a str>,
    {
        phrases
            .into_iter()
            .filter_map(|phrase| {
                let resolved = self.absolute_date(phrase, publication);
                if resolved.is_none() {
                    trace!(phrase, "Unresolvable date phrase");
                }
                resolved
            })
            .filter(|date| self.is_likely(*date, publication))
            .collect()
    }
}

/// Calendar resolution of a phrase relative to an anchor date.
///
/// Relative phrases ("last week", "two days ago", "Monday") are resolved
/// against the anchor. Everything else is read as a calendar date, with a
/// missing year taken from the anchor.
pub fn resolve_phrase(phrase: &str, anchor: NaiveDate) -> Option<NaiveDate> {
    let text = normalize_phrase(phrase);
    if text.is_empty() {
        return None;
    }
    relative_date(&text, anchor).or_else(|| calendar_date(&text, anchor.year()))
}

/// Lower-case, drop commas, ordinal suffixes and "the"
fn normalize_phrase(phrase: &str) -> String {
    let lower = phrase.to_lowercase().replace(',', " ");
    let lower = ORDINAL.replace_all(&lower, "$1");
    let text = lower
        .split_whitespace()
        .filter(|w| *w != "the")
        .collect::<Vec<_>>()
        .join(" ");
    text.trim_end_matches('.').to_string()
}

fn relative_date(text: &str, anchor: NaiveDate) -> Option<NaiveDate> {
    match text {
        "today" | "tonight" | "this morning" | "this afternoon" | "this evening" | "now" => {
            return Some(anchor)
        }
        "yesterday" | "last night" => return anchor.checked_sub_days(Days::new(1)),
        "tomorrow" => return anchor.checked_add_days(Days::new(1)),
        _ => {}
    }

    if let Some(caps) = AGO.captures(text) {
        let count = count_value(&caps[1])?;
        return shift(anchor, &caps[2], -(count as i64));
    }

    if let Some(caps) = RELATIVE_UNIT.captures(text) {
        let direction = match &caps[1] {
            "next" => 1,
            "this" => 0,
            _ => -1,
        };
        let unit = if &caps[2] == "weekend" { "week" } else { &caps[2] };
        return shift(anchor, unit, direction);
    }

    if let Some(caps) = WEEKDAY.captures(text) {
        let weekday: Weekday = caps[2].parse().ok()?;
        let target = weekday.num_days_from_monday() as i64;
        let current = anchor.weekday().num_days_from_monday() as i64;
        let ahead = (target - current).rem_euclid(7);
        return match caps.get(1).map(|m| m.as_str()) {
            Some("last" | "past" | "previous") => {
                let back = if ahead == 0 { 7 } else { 7 - ahead };
                anchor.checked_sub_days(Days::new(back as u64))
            }
            Some("next") => {
                let forward = if ahead == 0 { 7 } else { ahead };
                anchor.checked_add_days(Days::new(forward as u64))
            }
            _ => anchor.checked_add_days(Days::new(ahead as u64)),
        };
    }

    None
}

/// Absolute dates through `dateparser`
fn calendar_date(text: &str, year: i32) -> Option<NaiveDate> {
    let completed = complete_month_phrase(text, year);
    let input = completed.as_deref().unwrap_or(text);
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    dateparser::parse_with(input, &Utc, midnight)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Spell out month-name phrases as full dates: "june 3" becomes
/// "June 3, <year>", "may" becomes "May 1, <year>".
fn complete_month_phrase(text: &str, year: i32) -> Option<String> {
    let year_of = |m: Option<regex::Match<'_>>| {
        m.map_or_else(|| year.to_string(), |m| m.as_str().to_string())
    };

    if let Some(caps) = MONTH_DAY.captures(text) {
        let month = month_name(&caps[1])?;
        return Some(format!("{} {}, {}", month, &caps[2], year_of(caps.get(3))));
    }
    if let Some(caps) = DAY_MONTH.captures(text) {
        let month = month_name(&caps[2])?;
        return Some(format!("{} {} {}", &caps[1], month, year_of(caps.get(3))));
    }
    if let Some(caps) = MONTH_YEAR.captures(text) {
        let month = month_name(&caps[1])?;
        return Some(format!("{} 1, {}", month, year_of(caps.get(2))));
    }
    None
}

fn shift(anchor: NaiveDate, unit: &str, amount: i64) -> Option<NaiveDate> {
    let magnitude = amount.unsigned_abs();
    match unit {
        "day" | "week" => {
            let days = Days::new(if unit == "week" { magnitude * 7 } else { magnitude });
            if amount < 0 {
                anchor.checked_sub_days(days)
            } else {
                anchor.checked_add_days(days)
            }
        }
        "month" | "year" => {
            let months = u32::try_from(if unit == "year" { magnitude * 12 } else { magnitude }).ok()?;
            if amount < 0 {
                anchor.checked_sub_months(Months::new(months))
            } else {
                anchor.checked_add_months(Months::new(months))
            }
        }
        _ => None,
    }
}

fn count_value(word: &str) -> Option<u32> {
    let value = match word {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        digits => return digits.parse().ok(),
    };
    Some(value)
}

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn month_name(name: &str) -> Option<&'static str> {
    let month = month_number(name)?;
    MONTH_NAMES.get(month as usize - 1).copied()
}

fn month_number(name: &str) -> Option<u32> {
    let month = match &name[..name.len().min(3)] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

// ============================================================================
// Tests
// ============================================================================
