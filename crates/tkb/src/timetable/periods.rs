//! Period index to wall-clock time mapping.
//!
//! The academic day has three blocks of 45-minute periods:
//! - morning, periods 1-6 from 07:30, 20-minute break after period 3
//! - afternoon, periods 7-10 from 13:00, 10-minute break after period 8
//! - evening, periods 11-14 from 16:40, no long break
//!
//! Every other gap between periods is 5 minutes.

use chrono::{Duration, NaiveTime};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

/// Length of one period.
pub const PERIOD_MINUTES: i64 = 45;

/// Gap between consecutive periods unless a block says otherwise.
pub const SHORT_BREAK_MINUTES: i64 = 5;

/// Time reported for a period index outside the table.
pub const SENTINEL_TIME: &str = "00:00";

/// Rule for one contiguous block of periods.
struct BlockRule {
    periods: RangeInclusive<u32>,
    /// Minutes after midnight at which the first period starts
    starts_at: i64,
    /// Period after which the long break falls, and its length
    long_break: Option<(u32, i64)>,
}

const BLOCKS: [BlockRule; 3] = [
    BlockRule {
        periods: 1..=6,
        starts_at: 7 * 60 + 30,
        long_break: Some((3, 20)),
    },
    BlockRule {
        periods: 7..=10,
        starts_at: 13 * 60,
        long_break: Some((8, 10)),
    },
    BlockRule {
        periods: 11..=14,
        starts_at: 16 * 60 + 40,
        long_break: None,
    },
];

static DEFAULT_TABLE: LazyLock<PeriodTable> = LazyLock::new(PeriodTable::build);

/// Start and end of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodSpan {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Immutable lookup from 1-based period index to its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTable {
    spans: BTreeMap<u32, PeriodSpan>,
}

impl PeriodTable {
    /// The process-wide table, built on first use and never mutated.
    pub fn global() -> &'static PeriodTable {
        &DEFAULT_TABLE
    }

    /// Builds the table from the block rules.
    pub fn build() -> Self {
        let mut spans = BTreeMap::new();

        for block in &BLOCKS {
            let mut current = NaiveTime::default() + Duration::minutes(block.starts_at);

            for period in block.periods.clone() {
                let end = current + Duration::minutes(PERIOD_MINUTES);
                spans.insert(period, PeriodSpan { start: current, end });

                let gap = match block.long_break {
                    Some((after, minutes)) if after == period => minutes,
                    _ => SHORT_BREAK_MINUTES,
                };
                current = end + Duration::minutes(gap);
            }
        }

        Self { spans }
    }

    pub fn get(&self, period: u32) -> Option<&PeriodSpan> {
        self.spans.get(&period)
    }

    /// Start of `period` as `HH:MM`, or [`SENTINEL_TIME`] when out of range.
    pub fn start_label(&self, period: u32) -> String {
        self.get(period)
            .map(|span| span.start.format("%H:%M").to_string())
            .unwrap_or_else(|| SENTINEL_TIME.to_string())
    }

    /// End of `period` as `HH:MM`, or [`SENTINEL_TIME`] when out of range.
    pub fn end_label(&self, period: u32) -> String {
        self.get(period)
            .map(|span| span.end.format("%H:%M").to_string())
            .unwrap_or_else(|| SENTINEL_TIME.to_string())
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Default for PeriodTable {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(table: &PeriodTable, period: u32) -> (String, String) {
        (table.start_label(period), table.end_label(period))
    }

    #[test]
    fn test_morning_block() {
        let table = PeriodTable::build();
        assert_eq!(labels(&table, 1), ("07:30".into(), "08:15".into()));
        assert_eq!(labels(&table, 2), ("08:20".into(), "09:05".into()));
        assert_eq!(labels(&table, 3), ("09:10".into(), "09:55".into()));
        // 20-minute break after period 3
        assert_eq!(labels(&table, 4), ("10:15".into(), "11:00".into()));
        assert_eq!(labels(&table, 6), ("11:55".into(), "12:40".into()));
    }

    #[test]
    fn test_afternoon_block() {
        let table = PeriodTable::build();
        assert_eq!(labels(&table, 7), ("13:00".into(), "13:45".into()));
        assert_eq!(labels(&table, 8), ("13:50".into(), "14:35".into()));
        // 10-minute break after period 8
        assert_eq!(labels(&table, 9), ("14:45".into(), "15:30".into()));
        assert_eq!(labels(&table, 10), ("15:35".into(), "16:20".into()));
    }

    #[test]
    fn test_evening_block_uses_flat_stride() {
        let table = PeriodTable::build();
        assert_eq!(labels(&table, 11), ("16:40".into(), "17:25".into()));
        assert_eq!(labels(&table, 12), ("17:30".into(), "18:15".into()));
        assert_eq!(labels(&table, 13), ("18:20".into(), "19:05".into()));
        assert_eq!(labels(&table, 14), ("19:10".into(), "19:55".into()));
    }

    #[test]
    fn test_out_of_range_resolves_to_sentinel() {
        let table = PeriodTable::global();
        assert_eq!(table.len(), 14);
        assert_eq!(labels(table, 0), (SENTINEL_TIME.into(), SENTINEL_TIME.into()));
        assert_eq!(labels(table, 15), (SENTINEL_TIME.into(), SENTINEL_TIME.into()));
    }

    #[test]
    fn test_spans_are_ordered_and_disjoint_within_blocks() {
        let table = PeriodTable::global();
        for block in &BLOCKS {
            let mut previous_end: Option<NaiveTime> = None;
            for period in block.periods.clone() {
                let span = table.get(period).unwrap();
                assert!(span.start < span.end, "period {period}");
                if let Some(end) = previous_end {
                    assert!(end < span.start, "period {period} overlaps its predecessor");
                }
                previous_end = Some(span.end);
            }
        }
    }

    #[test]
    fn test_global_matches_fresh_build() {
        assert_eq!(PeriodTable::global(), &PeriodTable::build());
    }
}
