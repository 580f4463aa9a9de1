use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Upper bound on the backward streak walk: 10 years of daily entries.
const STREAK_HORIZON_DAYS: u64 = 3650;

/// Default trailing window for consistency reporting.
pub const DEFAULT_WINDOW_DAYS: usize = 7;

// ---------------------------------------------------------------------------
// DayCompletion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCompletion {
    pub day: NaiveDate,
    pub done: bool,
}

// ---------------------------------------------------------------------------
// CompletionLedger
// ---------------------------------------------------------------------------

/// Sparse per-day done/not-done record. A missing day means not done.
/// All read operations are pure functions of the snapshot plus a
/// reference date, so streak math is deterministic under test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionLedger {
    days: BTreeMap<NaiveDate, bool>,
}

impl CompletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (NaiveDate, bool)>) -> Self {
        Self {
            days: entries.into_iter().collect(),
        }
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Idempotent upsert.
    pub fn mark_done(&mut self, day: NaiveDate) {
        self.days.insert(day, true);
    }

    /// Idempotent upsert.
    pub fn mark_not_done(&mut self, day: NaiveDate) {
        self.days.insert(day, false);
    }

    // ---------------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------------

    pub fn is_done(&self, day: NaiveDate) -> bool {
        self.days.get(&day).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (NaiveDate, bool)> + '_ {
        self.days.iter().map(|(d, done)| (*d, *done))
    }

    /// Count consecutive done days walking backward from `as_of` inclusive.
    /// Stops at the first missing or not-done day, or at the horizon.
    pub fn streak(&self, as_of: NaiveDate) -> u32 {
        let mut count = 0u32;
        let mut day = as_of;
        for _ in 0..STREAK_HORIZON_DAYS {
            if !self.is_done(day) {
                break;
            }
            count += 1;
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
        count
    }

    /// The `n` most recent days ending at `as_of`, oldest first.
    pub fn trailing_window(&self, as_of: NaiveDate, n: usize) -> Vec<DayCompletion> {
        let mut window = Vec::with_capacity(n);
        for back in (0..n).rev() {
            let Some(day) = as_of.checked_sub_days(Days::new(back as u64)) else {
                continue;
            };
            window.push(DayCompletion {
                day,
                done: self.is_done(day),
            });
        }
        window
    }
}

/// Percentage of done days in a window, in `[0, 100]`.
pub fn consistency_rate(window: &[DayCompletion]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let done = window.iter().filter(|d| d.done).count();
    done as f64 / window.len() as f64 * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_ledger_has_zero_streak() {
        let ledger = CompletionLedger::new();
        assert_eq!(ledger.streak(day("2026-08-24")), 0);
    }

    #[test]
    fn streak_is_zero_iff_reference_day_not_done() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-23"));
        // Yesterday done, today not: streak as of today must be 0.
        assert_eq!(ledger.streak(day("2026-08-24")), 0);
        assert_eq!(ledger.streak(day("2026-08-23")), 1);
    }

    #[test]
    fn streak_counts_consecutive_days() {
        let mut ledger = CompletionLedger::new();
        for d in ["2026-08-20", "2026-08-21", "2026-08-22", "2026-08-23", "2026-08-24"] {
            ledger.mark_done(day(d));
        }
        assert_eq!(ledger.streak(day("2026-08-24")), 5);
    }

    #[test]
    fn streak_stops_at_gap() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-20"));
        // 21st missing
        ledger.mark_done(day("2026-08-22"));
        ledger.mark_done(day("2026-08-23"));
        ledger.mark_done(day("2026-08-24"));
        assert_eq!(ledger.streak(day("2026-08-24")), 3);
    }

    #[test]
    fn streak_stops_at_explicit_not_done() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-22"));
        ledger.mark_not_done(day("2026-08-23"));
        ledger.mark_done(day("2026-08-24"));
        assert_eq!(ledger.streak(day("2026-08-24")), 1);
    }

    #[test]
    fn streak_monotone_as_prior_days_fill_in() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-24"));
        let mut prev = ledger.streak(day("2026-08-24"));
        for d in ["2026-08-23", "2026-08-22", "2026-08-21"] {
            ledger.mark_done(day(d));
            let next = ledger.streak(day("2026-08-24"));
            assert!(next >= prev);
            prev = next;
        }
        assert_eq!(prev, 4);
    }

    #[test]
    fn mark_done_is_idempotent() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-24"));
        ledger.mark_done(day("2026-08-24"));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.streak(day("2026-08-24")), 1);
    }

    #[test]
    fn trailing_window_is_oldest_first() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-24"));
        ledger.mark_done(day("2026-08-22"));

        let window = ledger.trailing_window(day("2026-08-24"), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].day, day("2026-08-18"));
        assert_eq!(window[6].day, day("2026-08-24"));
        assert!(window[6].done);
        assert!(window[4].done);
        assert!(!window[5].done);
    }

    #[test]
    fn consistency_rate_bounds() {
        let ledger = CompletionLedger::new();
        let window = ledger.trailing_window(day("2026-08-24"), 7);
        assert_eq!(consistency_rate(&window), 0.0);

        let mut full = CompletionLedger::new();
        for back in 0..7 {
            full.mark_done(day("2026-08-24").checked_sub_days(Days::new(back)).unwrap());
        }
        let window = full.trailing_window(day("2026-08-24"), 7);
        assert_eq!(consistency_rate(&window), 100.0);
    }

    #[test]
    fn consistency_rate_partial_week() {
        let mut ledger = CompletionLedger::new();
        ledger.mark_done(day("2026-08-24"));
        ledger.mark_done(day("2026-08-23"));
        ledger.mark_done(day("2026-08-21"));
        let window = ledger.trailing_window(day("2026-08-24"), 7);
        let rate = consistency_rate(&window);
        assert!((rate - 300.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn consistency_rate_empty_window() {
        assert_eq!(consistency_rate(&[]), 0.0);
    }
}
