use super::util::{heading, progress_bar};
use crate::diagnostics::Diagnostics;
use crate::media::{
    Album, HistoryQuery, MediaLibrary, PlayHistory, PlayRecord, Track, WatchTimeStats,
    VARIOUS_ARTISTS,
};
use crate::ranking::{top_normalized, top_with_ties, FrequencyTable};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct StatsOptions<'a> {
    pub user: &'a str,
    pub library_name: &'a str,
    pub top_n: usize,
    /// Length of the reporting window.
    pub days: u32,
    /// First day of the reporting window.
    pub since: NaiveDate,
}

/// Track counts of the library itself, the denominators of the normalized
/// rankings.
#[derive(Debug, Default)]
pub struct LibraryCounts {
    pub albums: FrequencyTable,
    pub artists: FrequencyTable,
    pub genres: FrequencyTable,
    pub styles: FrequencyTable,
}

#[derive(Debug, Default)]
pub struct PlayCounts {
    pub tracks: FrequencyTable,
    pub albums: FrequencyTable,
    pub artists: FrequencyTable,
    pub genres: FrequencyTable,
    pub styles: FrequencyTable,
}

/// Library contents indexed by rating key.
pub struct LibrarySnapshot {
    tracks: HashMap<u64, Track>,
    albums: HashMap<u64, Album>,
    pub counts: LibraryCounts,
}

impl LibrarySnapshot {
    pub fn new(albums: Vec<Album>, tracks: Vec<Track>) -> LibrarySnapshot {
        let mut album_tracks: HashMap<u64, u64> = HashMap::new();
        let mut artist_tracks: HashMap<u64, u64> = HashMap::new();
        for track in &tracks {
            *album_tracks.entry(track.album_key).or_insert(0) += 1;
            *artist_tracks.entry(track.artist_key).or_insert(0) += 1;
        }

        let mut artist_albums: HashMap<u64, u64> = HashMap::new();
        for album in &albums {
            *artist_albums.entry(album.artist_key).or_insert(0) += 1;
        }

        let mut counts = LibraryCounts::default();
        let progress = progress_bar(albums.len() as u64);
        for album in &albums {
            progress.inc(1);
            let track_count = album_tracks.get(&album.rating_key).copied().unwrap_or(0);
            if track_count == 0 {
                continue;
            }

            if album.is_full_album() && track_count > 1 {
                counts.albums.add(album.full_title(), track_count);
            }

            // Only artists averaging more than two tracks per album.
            let total_tracks = artist_tracks.get(&album.artist_key).copied().unwrap_or(0);
            let total_albums = artist_albums.get(&album.artist_key).copied().unwrap_or(1);
            if album.artist_title != VARIOUS_ARTISTS && total_tracks > 2 * total_albums {
                counts.artists.add(album.artist_title.as_str(), track_count);
            }

            for genre in &album.genres {
                counts.genres.add(genre.as_str(), track_count);
            }
            for style in &album.styles {
                counts.styles.add(style.as_str(), track_count);
            }
        }
        progress.finish_and_clear();

        LibrarySnapshot {
            tracks: tracks.into_iter().map(|t| (t.rating_key, t)).collect(),
            albums: albums.into_iter().map(|a| (a.rating_key, a)).collect(),
            counts,
        }
    }

    pub fn track(&self, rating_key: u64) -> Option<&Track> {
        self.tracks.get(&rating_key)
    }

    pub fn album(&self, rating_key: u64) -> Option<&Album> {
        self.albums.get(&rating_key)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Counts completed plays. Plays of tracks that are no longer in the library
/// are counted under the titles stored with the play.
pub fn count_plays(
    plays: &[PlayRecord],
    snapshot: &LibrarySnapshot,
    diagnostics: &dyn Diagnostics,
) -> PlayCounts {
    let mut counts = PlayCounts::default();
    let progress = progress_bar(plays.len() as u64);

    for play in plays {
        progress.inc(1);
        if !play.is_complete() || play.title.is_empty() {
            continue;
        }

        let lib_item = snapshot.track(play.rating_key);
        let (track_title, album_title) = match lib_item {
            Some(track) => (track.full_title(), track.full_album_title()),
            None => {
                diagnostics.warning(&format!(
                    "{} - {} (id = {}) not found",
                    play.full_title, play.grandparent_title, play.rating_key
                ));
                (
                    format!("{} - {}", play.title, play.grandparent_title),
                    format!("{} - {}", play.parent_title, play.grandparent_title),
                )
            }
        };
        counts.tracks.increment(track_title);
        counts.albums.increment(album_title);

        let artist = if play.grandparent_title != VARIOUS_ARTISTS {
            &play.grandparent_title
        } else {
            &play.original_title
        };
        if !artist.is_empty() {
            counts.artists.increment(artist.as_str());
        }

        if let Some(album) = lib_item.and_then(|t| snapshot.album(t.album_key)) {
            counts.genres.extend(album.genres.iter().map(String::as_str));
            counts.styles.extend(album.styles.iter().map(String::as_str));
        }
    }
    progress.finish_and_clear();

    counts
}

#[derive(Debug)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug)]
pub struct StatsReport {
    pub watch_time: WatchTimeStats,
    pub sections: Vec<ReportSection>,
}

impl StatsReport {
    pub fn build(
        watch_time: WatchTimeStats,
        library: &LibraryCounts,
        plays: &PlayCounts,
        top_n: usize,
        diagnostics: &dyn Diagnostics,
    ) -> StatsReport {
        let top = |what: &str, table: &FrequencyTable| ReportSection {
            heading: format!("Top {} {}, including ties:", top_n, what),
            lines: top_with_ties(table, top_n),
        };
        let normalized = |what: &str, played: &FrequencyTable, total: &FrequencyTable| {
            ReportSection {
                heading: format!("Top {} {}, normalized, including ties:", top_n, what),
                lines: top_normalized(played, total, top_n, diagnostics),
            }
        };

        StatsReport {
            watch_time,
            sections: vec![
                top("tracks", &plays.tracks),
                top("albums", &plays.albums),
                top("artists", &plays.artists),
                top("styles", &plays.styles),
                top("genres", &plays.genres),
                normalized("albums", &plays.albums, &library.albums),
                normalized("artists", &plays.artists, &library.artists),
                normalized("styles", &plays.styles, &library.styles),
                normalized("genres", &plays.genres, &library.genres),
            ],
        }
    }

    pub fn minutes_listened(&self) -> u64 {
        self.watch_time.total_time / 60
    }

    pub fn print(&self) {
        println!("Minutes listened: {}", self.minutes_listened());
        println!("Tracks played: {}", self.watch_time.total_plays);
        println!();
        for section in &self.sections {
            println!("{}", heading(&section.heading));
            for line in &section.lines {
                println!("{}", line);
            }
            println!();
        }
    }
}

pub fn music_stats(
    library: &dyn MediaLibrary,
    history: &dyn PlayHistory,
    options: &StatsOptions<'_>,
    diagnostics: &dyn Diagnostics,
) -> Result<StatsReport> {
    let section = library
        .section(options.library_name)
        .with_context(|| format!("Opening library {}", options.library_name))?;

    log::info!("Getting map of all tracks to IDs + genre & style counts");
    let albums = library.albums(&section).context("Loading albums")?;
    let tracks = library.tracks(&section).context("Loading tracks")?;
    let snapshot = LibrarySnapshot::new(albums, tracks);
    log::info!("Library loaded: {} tracks", snapshot.track_count());

    let watch_time = history
        .watch_time_stats(&section, options.days)
        .context("Loading watch time stats")?;

    log::info!("Collecting play count data");
    let plays = history
        .history(&HistoryQuery {
            user: options.user,
            after: options.since,
            section: &section,
        })
        .context("Loading play history")?;
    let play_counts = count_plays(&plays, &snapshot, diagnostics);

    Ok(StatsReport::build(
        watch_time,
        &snapshot.counts,
        &play_counts,
        options.top_n,
        diagnostics,
    ))
}
