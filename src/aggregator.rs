// Aggregator - pure sums over a snapshot of entries
//
// Totals accumulate with saturating u64 arithmetic: they never wrap, and a
// personal savings log stays many orders of magnitude below the limit.

use crate::entities::{Amount, Entry, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total that fills the progress circle
pub const DEFAULT_PROGRESS_CEILING: Amount = 10_000;

/// Sum of every entry (0 for none)
pub fn total_of<'a, I>(entries: I) -> Amount
where
    I: IntoIterator<Item = &'a Entry>,
{
    entries
        .into_iter()
        .fold(0, |acc: Amount, entry| acc.saturating_add(entry.sum()))
}

/// Sum of the entries kept in `source` (0 if none match)
pub fn total_by_source<'a, I>(entries: I, source: Source) -> Amount
where
    I: IntoIterator<Item = &'a Entry>,
{
    total_of(entries.into_iter().filter(|entry| entry.source() == source))
}

/// Total per source; every source is present, unused ones at 0
pub fn totals_by_source<'a, I>(entries: I) -> BTreeMap<Source, Amount>
where
    I: IntoIterator<Item = &'a Entry>,
{
    let mut totals: BTreeMap<Source, Amount> =
        Source::ALL.iter().map(|source| (*source, 0)).collect();

    for entry in entries {
        let slot = totals.entry(entry.source()).or_insert(0);
        *slot = slot.saturating_add(entry.sum());
    }

    totals
}

/// Fraction of the default ceiling reached, clamped to [0, 1]
pub fn progress_fraction(total: Amount) -> f64 {
    progress_fraction_with_ceiling(total, DEFAULT_PROGRESS_CEILING)
}

/// Fraction of `ceiling` reached, clamped to [0, 1]
///
/// A zero ceiling counts as already reached by any positive total.
pub fn progress_fraction_with_ceiling(total: Amount, ceiling: Amount) -> f64 {
    if total >= ceiling {
        return if total == 0 { 0.0 } else { 1.0 };
    }
    total as f64 / ceiling as f64
}

/// Snapshot fed to the summary view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total: Amount,
    pub per_source: BTreeMap<Source, Amount>,
    pub entry_count: usize,
    pub progress: f64,
}

impl Summary {
    pub fn from_entries(entries: &[Entry], ceiling: Amount) -> Self {
        let total = total_of(entries);
        Summary {
            total,
            per_source: totals_by_source(entries),
            entry_count: entries.len(),
            progress: progress_fraction_with_ceiling(total, ceiling),
        }
    }

    /// Share of the grand total held in `source`, in [0, 1]
    pub fn share_of(&self, source: Source) -> f64 {
        let part = self.per_source.get(&source).copied().unwrap_or(0);
        progress_fraction_with_ceiling(part, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(rows: &[(Source, Amount)]) -> Vec<Entry> {
        rows
            .iter()
            .map(|(source, sum)| Entry::new(*source, *sum))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let none: Vec<Entry> = Vec::new();
        assert_eq!(total_of(&none), 0);
        for source in Source::ALL {
            assert_eq!(total_by_source(&none, source), 0);
        }
        assert_eq!(progress_fraction(0), 0.0);
    }

    #[test]
    fn test_totals_are_order_independent() {
        let mut list = entries(&[
            (Source::Binance, 5),
            (Source::KupatGemel, 1200),
            (Source::ApoalimUsd, 37),
        ]);
        let forward = total_of(&list);
        list.reverse();

        assert_eq!(forward, 1242);
        assert_eq!(total_of(&list), forward);
    }

    #[test]
    fn test_partition_property() {
        let list = entries(&[
            (Source::ApoalimStocks, 100),
            (Source::Binance, 250),
            (Source::Binance, 50),
            (Source::ApoalimUsd, 7),
        ]);

        let by_query: Amount = Source::ALL
            .iter()
            .map(|source| total_by_source(&list, *source))
            .sum();
        let by_map: Amount = totals_by_source(&list).values().sum();

        assert_eq!(by_query, total_of(&list));
        assert_eq!(by_map, total_of(&list));
        assert_eq!(totals_by_source(&list)[&Source::KupatGemel], 0);
    }

    #[test]
    fn test_saturates_instead_of_wrapping() {
        let list = entries(&[(Source::Binance, Amount::MAX), (Source::Binance, 1)]);
        assert_eq!(total_of(&list), Amount::MAX);
    }

    #[test]
    fn test_progress_bounds() {
        assert_eq!(progress_fraction(0), 0.0);
        assert_eq!(progress_fraction(2_500), 0.25);
        assert_eq!(progress_fraction(10_000), 1.0);
        assert_eq!(progress_fraction(15_000), 1.0);
        assert_eq!(progress_fraction(Amount::MAX), 1.0);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let mut previous = 0.0;
        for total in (0..=12_000).step_by(250) {
            let fraction = progress_fraction(total);
            assert!(fraction >= previous, "dropped at {total}");
            assert!((0.0..=1.0).contains(&fraction));
            previous = fraction;
        }
    }

    #[test]
    fn test_zero_ceiling() {
        assert_eq!(progress_fraction_with_ceiling(0, 0), 0.0);
        assert_eq!(progress_fraction_with_ceiling(1, 0), 1.0);
    }

    #[test]
    fn test_summary_shares() {
        let list = entries(&[(Source::ApoalimStocks, 100), (Source::Binance, 300)]);
        let summary = Summary::from_entries(&list, DEFAULT_PROGRESS_CEILING);

        assert_eq!(summary.total, 400);
        assert_eq!(summary.entry_count, 2);
        assert_eq!(summary.progress, 0.04);
        assert_eq!(summary.share_of(Source::Binance), 0.75);
        assert_eq!(summary.share_of(Source::KupatGemel), 0.0);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = Summary::from_entries(&[], DEFAULT_PROGRESS_CEILING);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.share_of(Source::Binance), 0.0);
        assert_eq!(summary.per_source.len(), Source::ALL.len());
    }
}
