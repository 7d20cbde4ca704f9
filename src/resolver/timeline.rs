//! Latest-record resolution over unordered dated streams

use std::cmp::Reverse;

use time::OffsetDateTime;

use super::record::{PositionRecord, StateHistoryEntry};

/// A record carrying the timestamp that orders its stream
pub trait Dated {
    fn date(&self) -> OffsetDateTime;
}

impl Dated for PositionRecord {
    fn date(&self) -> OffsetDateTime {
        self.date
    }
}

impl Dated for StateHistoryEntry {
    fn date(&self) -> OffsetDateTime {
        self.date
    }
}

impl<T: Dated> Dated for &T {
    fn date(&self) -> OffsetDateTime {
        (*self).date()
    }
}

/// The record with the maximum date, or `None` on an empty stream
///
/// Among tied maxima the first one in input order wins, the same record
/// [`sorted_descending`] puts in front.
pub fn latest<T: Dated>(records: &[T]) -> Option<&T> {
    records
        .iter()
        .reduce(|best, r| if r.date() > best.date() { r } else { best })
}

/// All records ordered by date, most recent first
///
/// Returns a new sequence of references; the caller's buffer is never
/// reordered. The sort is stable, so records sharing a date keep their
/// input order.
pub fn sorted_descending<T: Dated>(records: &[T]) -> Vec<&T> {
    let mut sorted: Vec<&T> = records.iter().collect();
    sorted.sort_by_key(|r| Reverse(r.date()));

    sorted
}
