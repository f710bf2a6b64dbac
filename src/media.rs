//! What the commands need from the media server and the history service.
//!
//! The concrete HTTP clients live in `cmds::plex_api` and
//! `cmds::tautulli_api`; commands only see these traits.

use crate::error::Result;
use chrono::NaiveDate;

pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// A library section, such as "Music".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub rating_key: u64,
    pub title: String,
    pub title_sort: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub rating_key: u64,
    pub title: String,
    pub title_sort: String,
    pub artist_key: u64,
    pub artist_title: String,
    pub genres: Vec<String>,
    pub styles: Vec<String>,
    /// Release format tags, "Album", "Single", "EP", ...
    pub formats: Vec<String>,
}

impl Album {
    /// "<album> - <artist>", the display key albums are ranked by.
    pub fn full_title(&self) -> String {
        format!("{} - {}", self.title, self.artist_title)
    }

    pub fn is_full_album(&self) -> bool {
        self.formats.first().map(String::as_str) == Some("Album")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub rating_key: u64,
    pub title: String,
    pub album_key: u64,
    pub album_title: String,
    pub artist_key: u64,
    pub artist_title: String,
    pub user_rating: Option<f64>,
}

impl Track {
    pub fn full_title(&self) -> String {
        format!("{} - {}", self.title, self.artist_title)
    }

    pub fn full_album_title(&self) -> String {
        format!("{} - {}", self.album_title, self.artist_title)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub rating_key: u64,
    pub title: String,
}

/// One entry of the playback history.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub rating_key: u64,
    /// 1 for a completed play, 0.5 for a partial one, 0 otherwise.
    pub watched_status: f64,
    pub title: String,
    pub full_title: String,
    pub parent_title: String,
    pub grandparent_title: String,
    pub original_title: String,
}

impl PlayRecord {
    pub fn is_complete(&self) -> bool {
        self.watched_status == 1.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchTimeStats {
    pub query_days: u32,
    /// Seconds.
    pub total_time: u64,
    pub total_plays: u64,
}

#[derive(Debug, Clone)]
pub struct HistoryQuery<'a> {
    pub user: &'a str,
    pub after: NaiveDate,
    pub section: &'a Section,
}

pub trait MediaLibrary {
    fn section(&self, name: &str) -> Result<Section>;
    fn artists(&self, section: &Section) -> Result<Vec<Artist>>;
    fn albums(&self, section: &Section) -> Result<Vec<Album>>;
    fn tracks(&self, section: &Section) -> Result<Vec<Track>>;
    /// Sort title of any library item, its title when none is set.
    fn sort_title(&self, rating_key: u64) -> Result<String>;
}

pub trait PlaylistStore {
    fn playlist(&self, title: &str) -> Result<Playlist>;
    fn playlist_items(&self, playlist: &Playlist) -> Result<Vec<Track>>;
    fn delete_playlist(&self, playlist: &Playlist) -> Result<()>;
    fn create_playlist(&self, title: &str, items: &[Track]) -> Result<Playlist>;
}

pub trait PlayHistory {
    fn history(&self, query: &HistoryQuery<'_>) -> Result<Vec<PlayRecord>>;
    fn watch_time_stats(&self, section: &Section, query_days: u32) -> Result<WatchTimeStats>;
}
