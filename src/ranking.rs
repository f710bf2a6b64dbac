//! Frequency counting and "top N with ties" rankings.
//!
//! A ranking is a list of lines, one per place. Keys sharing a score share a
//! place, so a ranking never has more than `top_n` lines but may name more
//! than `top_n` keys.

use crate::diagnostics::Diagnostics;
use itertools::Itertools;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_TOP_N: usize = 5;

/// Number of occurrences per display key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: HashMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> FrequencyTable {
        FrequencyTable::default()
    }

    pub fn increment(&mut self, key: impl Into<String>) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: impl Into<String>, count: u64) {
        *self.counts.entry(key.into()).or_insert(0) += count;
    }

    /// Count for `key`, zero when it was never seen.
    pub fn get(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.counts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn values(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }

    /// Entries sorted by count descending, ties by key ascending.
    pub fn most_common(&self) -> Vec<(&str, u64)> {
        self.iter()
            .sorted_by(|(k1, v1), (k2, v2)| v2.cmp(v1).then_with(|| k1.cmp(k2)))
            .collect()
    }
}

impl<K: Into<String>> Extend<K> for FrequencyTable {
    fn extend<I: IntoIterator<Item = K>>(&mut self, keys: I) {
        for key in keys {
            self.increment(key);
        }
    }
}

impl<K: Into<String>> FromIterator<K> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut table = FrequencyTable::new();
        table.extend(keys);
        table
    }
}

/// Counts `items` by the key `key_fn` derives; items mapped to `None` are
/// not counted.
pub fn count_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> FrequencyTable
where
    K: Into<String>,
    F: FnMut(&T) -> Option<K>,
{
    items.into_iter().filter_map(|item| key_fn(&item)).collect()
}

/// A rate rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// `None` when the denominator is zero. Halves round to even.
    pub fn new(numerator: u64, denominator: u64) -> Option<Ratio> {
        if denominator == 0 {
            return None;
        }
        let raw = numerator as f64 / denominator as f64;
        Some(Ratio((raw * 100.0).round_ties_even() / 100.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Formats an already sorted sequence of `(key, score)` pairs as ranking
/// lines, grouping runs of equal scores into one place.
///
/// The last group is emitted too, as long as its place is within `top_n`.
pub fn format_list_with_ties<K, S, I>(sorted: I, top_n: usize) -> Vec<String>
where
    I: IntoIterator<Item = (K, S)>,
    K: AsRef<str>,
    S: PartialEq + Clone + fmt::Display,
{
    let mut lines = Vec::new();
    if top_n == 0 {
        return lines;
    }

    let places = sorted.into_iter().chunk_by(|(_, score)| score.clone());
    for (place, (score, group)) in (&places).into_iter().enumerate() {
        let keys = group.map(|(key, _)| key.as_ref().to_string()).join("; ");
        lines.push(format!("{}. {}: {}", place + 1, keys, score));
        if lines.len() >= top_n {
            break;
        }
    }

    lines
}

/// Ranks the keys of `table` by count.
pub fn top_with_ties(table: &FrequencyTable, top_n: usize) -> Vec<String> {
    format_list_with_ties(table.most_common(), top_n)
}

/// Divides each count in `plays` by the matching count in `totals`.
///
/// Keys without a non-zero total are left out and reported to `diagnostics`.
/// The result is sorted by ratio descending, ties by key ascending.
pub fn normalize(
    plays: &FrequencyTable,
    totals: &FrequencyTable,
    diagnostics: &dyn Diagnostics,
) -> Vec<(String, Ratio)> {
    let mut ratios = Vec::with_capacity(plays.len());
    for (key, count) in plays.iter() {
        match Ratio::new(count, totals.get(key)) {
            Some(ratio) => ratios.push((key.to_string(), ratio)),
            None => diagnostics.info(&format!("Zero tracks for {}", key)),
        }
    }

    ratios.sort_by(|(k1, r1), (k2, r2)| {
        r2.value()
            .total_cmp(&r1.value())
            .then_with(|| k1.cmp(k2))
    });
    ratios
}

/// Ranks the keys of `plays` by their rate against `totals`.
pub fn top_normalized(
    plays: &FrequencyTable,
    totals: &FrequencyTable,
    top_n: usize,
    diagnostics: &dyn Diagnostics,
) -> Vec<String> {
    format_list_with_ties(normalize(plays, totals, diagnostics), top_n)
}
