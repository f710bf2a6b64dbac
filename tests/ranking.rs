use plex_tools::diagnostics::{Recorder, Severity};
use plex_tools::ranking::{
    count_by, format_list_with_ties, normalize, top_normalized, top_with_ties, FrequencyTable,
    DEFAULT_TOP_N,
};

fn table(entries: &[(&str, u64)]) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for (key, count) in entries {
        table.add(*key, *count);
    }
    table
}

/// Number of keys named across all lines.
fn keys_listed(lines: &[String]) -> usize {
    lines
        .iter()
        .map(|line| {
            let body = line.split_once(". ").unwrap().1;
            let keys = body.rsplit_once(": ").unwrap().0;
            keys.split("; ").count()
        })
        .sum()
}

#[test]
fn counts_add_up_to_mapped_items() {
    let plays = ["a", "b", "a", "skip", "c", "a", "skip"];
    let counts = count_by(plays, |p| if *p == "skip" { None } else { Some(*p) });

    let mapped = plays.iter().filter(|p| **p != "skip").count() as u64;
    assert_eq!(counts.total(), mapped);
    assert_eq!(counts.len(), 3);
}

#[test]
fn lines_never_exceed_top_n() {
    let counts = table(&[
        ("a", 9),
        ("b", 8),
        ("c", 8),
        ("d", 7),
        ("e", 6),
        ("f", 5),
        ("g", 4),
        ("h", 3),
    ]);
    for top_n in 1..10 {
        assert!(top_with_ties(&counts, top_n).len() <= top_n);
    }
}

#[test]
fn distinct_scores_fill_min_of_top_n_and_keys() {
    let counts = table(&[("a", 5), ("b", 4), ("c", 3)]);
    assert_eq!(top_with_ties(&counts, 2).len(), 2);
    assert_eq!(top_with_ties(&counts, DEFAULT_TOP_N).len(), 3);
    assert_eq!(
        top_with_ties(&counts, DEFAULT_TOP_N),
        vec!["1. a: 5", "2. b: 4", "3. c: 3"]
    );
}

#[test]
fn boundary_tie_is_listed_in_full() {
    let counts = table(&[("a", 5), ("b", 3), ("c", 3), ("d", 3), ("e", 1)]);
    let lines = top_with_ties(&counts, 2);

    assert_eq!(lines, vec!["1. a: 5", "2. b; c; d: 3"]);
    assert_eq!(keys_listed(&lines), 4);
}

#[test]
fn tie_then_tail_with_two_places() {
    let counts = table(&[("A", 10), ("B", 10), ("C", 5)]);
    assert_eq!(top_with_ties(&counts, 2), vec!["1. A; B: 10", "2. C: 5"]);
}

#[test]
fn single_entry() {
    assert_eq!(format_list_with_ties([("X", 3u64)], 5), vec!["1. X: 3"]);
}

#[test]
fn empty_input() {
    assert!(format_list_with_ties(Vec::<(String, u64)>::new(), 5).is_empty());
}

#[test]
fn presorted_input_keeps_caller_order_within_ties() {
    let sorted = vec![("zeta", 2u64), ("alpha", 2), ("mid", 1)];
    assert_eq!(
        format_list_with_ties(sorted, 5),
        vec!["1. zeta; alpha: 2", "2. mid: 1"]
    );
}

#[test]
fn zero_total_is_never_ranked() {
    let plays = table(&[("Artist1", 4)]);
    let totals = table(&[("Artist1", 0)]);
    let recorder = Recorder::new();

    assert!(top_normalized(&plays, &totals, 5, &recorder).is_empty());
    assert_eq!(
        recorder.notes(),
        vec![(Severity::Info, "Zero tracks for Artist1".to_string())]
    );
}

#[test]
fn normalized_ties_share_a_place() {
    let plays = table(&[("a", 1), ("b", 2), ("c", 3), ("gone", 3)]);
    let totals = table(&[("a", 2), ("b", 4), ("c", 4)]);
    let recorder = Recorder::new();

    let ratios = normalize(&plays, &totals, &recorder);
    assert!(ratios.iter().all(|(key, _)| key != "gone"));

    assert_eq!(
        top_normalized(&plays, &totals, 5, &recorder),
        vec!["1. c: 0.75", "2. a; b: 0.50"]
    );
}
