use super::util::heading;
use crate::config::{Config, SortKey};
use crate::diagnostics::Diagnostics;
use crate::error::{self, Error};
use crate::media::{MediaLibrary, PlaylistStore, Track};
use anyhow::{Context, Result};
use console::Term;
use dialoguer::Confirm;
use std::cmp::Ordering;
use std::collections::HashMap;

/// One component of a track's sort tuple.
#[derive(Debug, Clone)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Less,
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Greater,
        }
    }
}

/// Lower-cased sort titles of artists and albums, fetched once per key.
struct SortTitles<'a> {
    library: &'a dyn MediaLibrary,
    cache: HashMap<u64, String>,
}

impl<'a> SortTitles<'a> {
    fn new(library: &'a dyn MediaLibrary) -> SortTitles<'a> {
        SortTitles {
            library,
            cache: HashMap::new(),
        }
    }

    fn get(&mut self, rating_key: u64) -> error::Result<String> {
        if let Some(title) = self.cache.get(&rating_key) {
            return Ok(title.clone());
        }
        let title = self.library.sort_title(rating_key)?.to_lowercase();
        self.cache.insert(rating_key, title.clone());
        Ok(title)
    }
}

fn sort_value(track: &Track, key: SortKey, titles: &mut SortTitles<'_>) -> error::Result<SortValue> {
    Ok(match key {
        SortKey::Artist => SortValue::Text(titles.get(track.artist_key)?),
        SortKey::Album => SortValue::Text(titles.get(track.album_key)?),
        // Highest rated first, unrated after every rated track.
        SortKey::Rating => SortValue::Number(track.user_rating.map(|r| -r).unwrap_or(1.0)),
    })
}

/// Stable sort of `items` by the tuple of `keys`.
fn sort_items(
    items: Vec<Track>,
    keys: &[SortKey],
    titles: &mut SortTitles<'_>,
) -> error::Result<Vec<Track>> {
    let mut keyed = items
        .into_iter()
        .map(|track| {
            let tuple = keys
                .iter()
                .map(|key| sort_value(&track, *key, titles))
                .collect::<error::Result<Vec<_>>>()?;
            Ok((tuple, track))
        })
        .collect::<error::Result<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(keyed.into_iter().map(|(_, track)| track).collect())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SortOptions {
    /// Print the new order instead of re-creating the playlists.
    pub dry_run: bool,
}

#[derive(Debug, Default, PartialEq)]
pub struct SortSummary {
    pub sorted: Vec<String>,
    pub unchanged: Vec<String>,
    pub skipped: Vec<String>,
}

/// Asks before playlists are deleted and re-created. Always yes when nobody
/// is at the terminal.
pub fn confirm_rewrite(config: &Config) -> Result<bool> {
    if !Term::stdout().features().is_attended() {
        return Ok(true);
    }
    let count: usize = config.orders.iter().map(|o| o.playlists.len()).sum();
    let answer = Confirm::new()
        .with_prompt(heading(&format!(
            "Re-create up to {} playlists in their new order?",
            count
        )))
        .default(false)
        .interact()?;
    Ok(answer)
}

pub fn sort_playlists(
    library: &dyn MediaLibrary,
    store: &dyn PlaylistStore,
    config: &Config,
    options: SortOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<SortSummary> {
    let mut titles = SortTitles::new(library);
    let mut summary = SortSummary::default();

    for order in &config.orders {
        for name in &order.playlists {
            log::info!("Sorting {}", name);
            let playlist = match store.playlist(name) {
                Ok(playlist) => playlist,
                Err(Error::PlaylistNotFound(_)) => {
                    diagnostics.error(&format!("{} not found, skipping.", name));
                    summary.skipped.push(name.clone());
                    continue;
                }
                Err(e) => return Err(e).with_context(|| format!("Looking up playlist {}", name)),
            };

            let items = store
                .playlist_items(&playlist)
                .with_context(|| format!("Loading items of {}", name))?;
            if items.is_empty() {
                diagnostics.warning(&format!("{} is empty, skipping.", name));
                summary.skipped.push(name.clone());
                continue;
            }

            let before = items.iter().map(|t| t.rating_key).collect::<Vec<_>>();
            let sorted = sort_items(items, &order.keys, &mut titles)
                .with_context(|| format!("Sorting {}", name))?;

            if options.dry_run {
                println!("{}", heading(&format!("{}:", name)));
                for (i, track) in sorted.iter().enumerate() {
                    println!("{}. {}", i + 1, track.full_title());
                }
                println!();
            }

            if sorted.iter().map(|t| t.rating_key).eq(before) {
                log::info!("{} is already in order", name);
                summary.unchanged.push(name.clone());
                continue;
            }

            // The old playlist goes only once the sorted copy exists.
            if !options.dry_run {
                store
                    .create_playlist(name, &sorted)
                    .with_context(|| format!("Re-creating {}", name))?;
                store
                    .delete_playlist(&playlist)
                    .with_context(|| format!("Deleting the unsorted {}", name))?;
            }
            summary.sorted.push(name.clone());
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlaylistOrder;
    use crate::diagnostics::{Recorder, Severity};
    use crate::media::{Album, Artist, Playlist, Section};
    use std::cell::RefCell;

    fn track(key: u64, artist_key: u64, album_key: u64, rating: Option<f64>) -> Track {
        Track {
            rating_key: key,
            title: format!("Track {}", key),
            album_key,
            album_title: String::new(),
            artist_key,
            artist_title: String::new(),
            user_rating: rating,
        }
    }

    #[derive(Default)]
    struct FakeServer {
        sort_titles: HashMap<u64, String>,
        playlists: RefCell<Vec<(Playlist, Vec<Track>)>>,
        title_lookups: RefCell<usize>,
        deleted: RefCell<Vec<String>>,
        refuse_create: bool,
    }

    impl FakeServer {
        fn add_playlist(&self, key: u64, title: &str, items: Vec<Track>) {
            let playlist = Playlist {
                rating_key: key,
                title: title.to_string(),
            };
            self.playlists.borrow_mut().push((playlist, items));
        }

        fn copies_of(&self, title: &str) -> usize {
            self.playlists
                .borrow()
                .iter()
                .filter(|(p, _)| p.title == title)
                .count()
        }

        fn order_of(&self, title: &str) -> Vec<u64> {
            self.playlists
                .borrow()
                .iter()
                .find(|(p, _)| p.title == title)
                .map(|(_, items)| items.iter().map(|t| t.rating_key).collect())
                .unwrap_or_default()
        }
    }

    impl MediaLibrary for FakeServer {
        fn section(&self, name: &str) -> error::Result<Section> {
            Err(Error::SectionNotFound(name.to_string()))
        }

        fn artists(&self, _section: &Section) -> error::Result<Vec<Artist>> {
            Ok(vec![])
        }

        fn albums(&self, _section: &Section) -> error::Result<Vec<Album>> {
            Ok(vec![])
        }

        fn tracks(&self, _section: &Section) -> error::Result<Vec<Track>> {
            Ok(vec![])
        }

        fn sort_title(&self, rating_key: u64) -> error::Result<String> {
            *self.title_lookups.borrow_mut() += 1;
            self.sort_titles
                .get(&rating_key)
                .cloned()
                .ok_or(Error::ItemNotFound(rating_key))
        }
    }

    impl PlaylistStore for FakeServer {
        fn playlist(&self, title: &str) -> error::Result<Playlist> {
            self.playlists
                .borrow()
                .iter()
                .find(|(p, _)| p.title == title)
                .map(|(p, _)| p.clone())
                .ok_or_else(|| Error::PlaylistNotFound(title.to_string()))
        }

        fn playlist_items(&self, playlist: &Playlist) -> error::Result<Vec<Track>> {
            Ok(self
                .playlists
                .borrow()
                .iter()
                .find(|(p, _)| p.rating_key == playlist.rating_key)
                .map(|(_, items)| items.clone())
                .unwrap_or_default())
        }

        fn delete_playlist(&self, playlist: &Playlist) -> error::Result<()> {
            self.deleted.borrow_mut().push(playlist.title.clone());
            self.playlists
                .borrow_mut()
                .retain(|(p, _)| p.rating_key != playlist.rating_key);
            Ok(())
        }

        fn create_playlist(&self, title: &str, items: &[Track]) -> error::Result<Playlist> {
            if self.refuse_create {
                return Err(Error::PlaylistNotFound(title.to_string()));
            }
            let playlist = Playlist {
                rating_key: 99,
                title: title.to_string(),
            };
            self.playlists
                .borrow_mut()
                .push((playlist.clone(), items.to_vec()));
            Ok(playlist)
        }
    }

    fn server() -> FakeServer {
        let mut server = FakeServer::default();
        server.sort_titles.insert(1, "Beatles, The".to_string());
        server.sort_titles.insert(2, "ABBA".to_string());
        server.sort_titles.insert(10, "Zebra".to_string());
        server.sort_titles.insert(20, "apple".to_string());
        server
    }

    fn config(keys: Vec<SortKey>, playlists: &[&str]) -> Config {
        Config {
            orders: vec![PlaylistOrder {
                keys,
                playlists: playlists.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn sorts_by_artist_then_rating() {
        let server = server();
        server.add_playlist(
            7,
            "Running",
            vec![
                track(1, 1, 10, Some(8.0)),
                track(2, 2, 20, None),
                track(3, 1, 10, Some(10.0)),
                track(4, 2, 20, Some(6.0)),
            ],
        );
        let recorder = Recorder::new();

        let summary = sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Artist, SortKey::Rating], &["Running"]),
            SortOptions::default(),
            &recorder,
        )
        .unwrap();

        assert_eq!(summary.sorted, vec!["Running"]);
        assert_eq!(server.order_of("Running"), vec![4, 2, 3, 1]);
        assert_eq!(server.copies_of("Running"), 1);
        assert_eq!(*server.deleted.borrow(), vec!["Running"]);
        assert_eq!(*server.title_lookups.borrow(), 2);
        assert!(recorder.notes().is_empty());
    }

    #[test]
    fn rating_sort_is_stable() {
        let server = server();
        server.add_playlist(
            8,
            "Played",
            vec![
                track(1, 1, 10, None),
                track(2, 2, 20, Some(4.0)),
                track(3, 1, 10, None),
                track(4, 2, 20, Some(4.0)),
            ],
        );

        sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Rating], &["Played"]),
            SortOptions::default(),
            &Recorder::new(),
        )
        .unwrap();

        assert_eq!(server.order_of("Played"), vec![2, 4, 1, 3]);
    }

    #[test]
    fn album_sort_uses_lowercase_titles() {
        let server = server();
        server.add_playlist(
            9,
            "Road Trip",
            vec![track(1, 1, 10, None), track(2, 2, 20, None)],
        );

        sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Album], &["Road Trip"]),
            SortOptions::default(),
            &Recorder::new(),
        )
        .unwrap();

        assert_eq!(server.order_of("Road Trip"), vec![2, 1]);
    }

    #[test]
    fn missing_playlist_is_skipped_and_run_continues() {
        let server = server();
        server.add_playlist(7, "Workout", vec![track(1, 1, 10, None), track(2, 2, 20, None)]);
        let recorder = Recorder::new();

        let summary = sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Artist], &["Openings", "Workout"]),
            SortOptions::default(),
            &recorder,
        )
        .unwrap();

        assert_eq!(summary.skipped, vec!["Openings"]);
        assert_eq!(summary.sorted, vec!["Workout"]);
        assert_eq!(
            recorder.notes(),
            vec![(Severity::Error, "Openings not found, skipping.".to_string())]
        );
    }

    #[test]
    fn dry_run_and_sorted_playlists_are_left_alone() {
        let server = server();
        server.add_playlist(7, "Singing", vec![track(1, 1, 10, None), track(2, 2, 20, None)]);
        server.add_playlist(8, "Openings", vec![track(2, 2, 20, None), track(1, 1, 10, None)]);

        let summary = sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Artist], &["Singing", "Openings"]),
            SortOptions { dry_run: true },
            &Recorder::new(),
        )
        .unwrap();

        assert_eq!(summary.sorted, vec!["Singing"]);
        assert_eq!(summary.unchanged, vec!["Openings"]);
        assert!(server.deleted.borrow().is_empty());
        assert_eq!(server.order_of("Singing"), vec![1, 2]);
    }

    #[test]
    fn empty_playlist_is_not_recreated() {
        let server = server();
        server.add_playlist(7, "Love Songs", vec![]);
        let recorder = Recorder::new();

        let summary = sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Artist], &["Love Songs"]),
            SortOptions::default(),
            &recorder,
        )
        .unwrap();

        assert_eq!(summary.skipped, vec!["Love Songs"]);
        assert!(server.deleted.borrow().is_empty());
        assert_eq!(recorder.count(Severity::Warning), 1);
    }

    #[test]
    fn failed_create_keeps_the_old_playlist() {
        let mut server = server();
        server.refuse_create = true;
        server.add_playlist(7, "Workout", vec![track(1, 1, 10, None), track(2, 2, 20, None)]);

        let result = sort_playlists(
            &server,
            &server,
            &config(vec![SortKey::Artist], &["Workout"]),
            SortOptions::default(),
            &Recorder::new(),
        );

        assert!(result.is_err());
        assert!(server.deleted.borrow().is_empty());
        assert_eq!(server.order_of("Workout"), vec![1, 2]);
    }

    #[test]
    fn sort_values_order_within_kind() {
        assert!(SortValue::Number(-10.0) < SortValue::Number(1.0));
        assert!(SortValue::Text("abba".into()) < SortValue::Text("beatles".into()));
        assert_eq!(SortValue::Number(2.0), SortValue::Number(2.0));
    }
}
