//! Service instance availability windows
//!
//! An instance without availability data is always available. Otherwise at
//! least one period must cover `now`, and if that period has intervals, one
//! of them must cover `now`'s weekday and UTC time of day.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::xml::{optional_attribute, Document, NodeId};

/// Recurring daily window inside a period
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// ISO weekdays, 1 = Monday .. 7 = Sunday. `None` = every day.
    pub days: Option<Vec<u8>>,
    /// Carried as-is, not evaluated
    pub recurrence: Option<String>,
    /// Inclusive start, UTC
    pub start_time: Option<NaiveTime>,
    /// Exclusive end, UTC
    pub end_time: Option<NaiveTime>,
}

impl Interval {
    pub fn matches(&self, now: DateTime<Utc>) -> bool {
        if let Some(ref days) = self.days {
            let weekday = now.weekday().number_from_monday() as u8;
            if !days.contains(&weekday) {
                return false;
            }
        }

        let time = now.time();
        if let Some(start) = self.start_time {
            if start > time {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if end <= time {
                return false;
            }
        }
        true
    }
}

/// Validity bounds plus optional intervals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub intervals: Vec<Interval>,
}

impl Period {
    /// Whether `now` lies within the validity bounds (both inclusive)
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_from.map_or(true, |from| now >= from) && self.valid_to.map_or(true, |to| now <= to)
    }

    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_valid_at(now) && (self.intervals.is_empty() || self.intervals.iter().any(|i| i.matches(now)))
    }
}

/// Evaluate availability for one instant.
///
/// `None` means the instance declared no availability at all.
pub fn is_available(periods: Option<&[Period]>, now: DateTime<Utc>) -> bool {
    match periods {
        None => true,
        Some(periods) => periods.iter().any(|p| p.is_available_at(now)),
    }
}

/// Current time truncated to whole seconds
pub fn now_seconds() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse the `Period` children of an `Availability` element
pub fn parse_availability(doc: &Document, node: NodeId) -> Vec<Period> {
    doc.children(node, "Period")
        .map(|period| Period {
            valid_from: optional_attribute(doc, period, "validFrom").and_then(parse_instant),
            valid_to: optional_attribute(doc, period, "validTo").and_then(parse_instant),
            intervals: doc
                .children(period, "Interval")
                .map(|interval| parse_interval(doc, interval))
                .collect(),
        })
        .collect()
}

fn parse_interval(doc: &Document, node: NodeId) -> Interval {
    Interval {
        days: optional_attribute(doc, node, "days").map(parse_days),
        recurrence: optional_attribute(doc, node, "recurrence").map(str::to_string),
        start_time: optional_attribute(doc, node, "startTime").and_then(parse_time_of_day),
        end_time: optional_attribute(doc, node, "endTime").and_then(parse_time_of_day),
    }
}

/// "1 2 3", "1,2,3" and "123" all give [1, 2, 3]
pub fn parse_days(days: &str) -> Vec<u8> {
    days.chars()
        .filter_map(|c| c.to_digit(10))
        .filter(|d| (1..=7).contains(d))
        .map(|d| d as u8)
        .collect()
}

/// `HH:MM:SSZ` → time of day. Malformed values become "no bound".
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    let time = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    match NaiveTime::parse_from_str(time, "%H:%M:%S") {
        Ok(t) => Some(t),
        Err(e) => {
            warn!("Ignoring malformed interval time '{}': {}", value, e);
            None
        }
    }
}

/// RFC 3339 instant; zone-less values are taken as UTC.
/// Malformed values become "no bound".
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    warn!("Ignoring malformed validity instant '{}'", value);
    None
}
