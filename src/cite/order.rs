//! Newest-first ordering of records.

use std::cmp::Reverse;

use super::year::{resolve_year, Clock};
use crate::models::Record;

/// Sort key: year descending, then lowercase title ascending
pub fn sort_key(record: &Record, clock: &dyn Clock) -> (Reverse<i32>, String) {
    let title = record.raw_str("title").unwrap_or_default().to_lowercase();
    (Reverse(resolve_year(record, clock)), title)
}

/// Order records newest first with a title tiebreak.
///
/// The sort is stable: records with equal keys keep their relative order.
pub fn sort_records(records: &mut [Record], clock: &dyn Clock) {
    records.sort_by_cached_key(|r| sort_key(r, clock));
}
