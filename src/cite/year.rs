//! Publication year resolution.
//!
//! The year is taken from the first source that yields one:
//!
//! 1. an explicit `year` / `Year` field (first four characters),
//! 2. a date field (`published`, `date`, `issued`, `pub_date`) given as a
//!    string or as CSL-JSON `date-parts`,
//! 3. a `(YYYY)` inside `pages`, `citation`, `title` or `journal`,
//! 4. the current calendar year.

use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_yaml::Value;

use crate::models::{scalar_text, Record};

const YEAR_KEYS: &[&str] = &["year", "Year"];
const DATE_KEYS: &[&str] = &["published", "date", "issued", "pub_date"];
const DATE_PARTS_KEYS: &[&str] = &["date-parts", "date_parts"];
const SCAN_KEYS: &[&str] = &["pages", "citation", "title", "journal"];

/// Source of "now" for the last-resort fallback and backup timestamps.
pub trait Clock: Send + Sync {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;

    /// Current calendar year
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Midnight at the start of the given day, if the date exists
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Resolve the publication year of a record. Never fails.
pub fn resolve_year(record: &Record, clock: &dyn Clock) -> i32 {
    explicit_year(record)
        .or_else(|| date_field_year(record))
        .or_else(|| scanned_year(record))
        .unwrap_or_else(|| clock.current_year())
}

fn explicit_year(record: &Record) -> Option<i32> {
    YEAR_KEYS.iter().find_map(|key| {
        let text = record.get(key).and_then(scalar_text)?;
        let head: String = text.chars().take(4).collect();
        head.trim().parse().ok()
    })
}

fn leading_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})").expect("leading year pattern is valid"))
}

fn bracketed_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{4})\)").expect("bracketed year pattern is valid"))
}

fn date_field_year(record: &Record) -> Option<i32> {
    DATE_KEYS
        .iter()
        .find_map(|key| record.get(key).and_then(year_from_date_value))
}

fn year_from_date_value(value: &Value) -> Option<i32> {
    match value {
        Value::String(s) => leading_year_re()
            .captures(s.trim())
            .and_then(|c| c[1].parse().ok()),
        Value::Mapping(m) => {
            let parts = DATE_PARTS_KEYS
                .iter()
                .find_map(|k| m.get(*k).and_then(Value::as_sequence))?;
            let first = parts.first()?.as_sequence()?.first()?;
            date_part_as_year(first)
        }
        Value::Tagged(tagged) => year_from_date_value(&tagged.value),
        _ => None,
    }
}

fn date_part_as_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn scanned_year(record: &Record) -> Option<i32> {
    SCAN_KEYS.iter().find_map(|key| {
        let text = record.raw_str(key)?;
        bracketed_year_re()
            .captures(text)
            .and_then(|c| c[1].parse().ok())
    })
}
