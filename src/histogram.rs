//! Text histograms of a value distribution.

use itertools::Itertools;

const BAR_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bin {
    pub low: u64,
    pub high: u64,
    pub count: usize,
}

/// Bin edges for per-artist track counts: fine steps for small artists,
/// coarser ones up to the biggest artist.
pub fn artist_bin_edges(max: u64) -> Vec<u64> {
    (0..60)
        .step_by(10)
        .chain((50..225).step_by(25))
        .chain((200..550).step_by(50))
        .chain((500..max + 100).step_by(100))
        .sorted()
        .dedup()
        .collect()
}

/// Counts `values` per bin. Bins are `[low, high)`, except the last which
/// also holds `high`. Values outside the edges are not counted.
pub fn histogram(values: &[u64], edges: &[u64]) -> Vec<Bin> {
    let last = edges.len().saturating_sub(2);
    edges
        .windows(2)
        .enumerate()
        .map(|(i, edge)| {
            let (low, high) = (edge[0], edge[1]);
            let count = values
                .iter()
                .filter(|&&v| v >= low && (v < high || (i == last && v == high)))
                .count();
            Bin { low, high, count }
        })
        .collect()
}

/// One line per bin, bars scaled to the fullest bin.
pub fn render(bins: &[Bin]) -> Vec<String> {
    let peak = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let label_width = bins
        .iter()
        .map(|b| format!("{}-{}", b.low, b.high).len())
        .max()
        .unwrap_or(0);

    bins.iter()
        .map(|bin| {
            let bar = if peak == 0 {
                0
            } else {
                (bin.count * BAR_WIDTH + peak - 1) / peak
            };
            format!(
                "{:>width$} │{} {}",
                format!("{}-{}", bin.low, bin.high),
                "█".repeat(bar),
                bin.count,
                width = label_width
            )
        })
        .collect()
}
