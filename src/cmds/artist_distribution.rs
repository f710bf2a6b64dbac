use super::util::heading;
use crate::histogram::{artist_bin_edges, histogram, render, Bin};
use crate::media::{Artist, MediaLibrary, Track};
use crate::ranking::FrequencyTable;
use anyhow::{Context, Result};
use std::collections::HashMap;

const TOP_ARTISTS: usize = 10;
/// Artists with fewer tracks than this are listed as the long tail.
const SMALL_ARTIST: u64 = 10;

pub fn artist_track_counts(artists: &[Artist], tracks: &[Track]) -> FrequencyTable {
    let mut per_artist: HashMap<u64, u64> = HashMap::new();
    for track in tracks {
        *per_artist.entry(track.artist_key).or_insert(0) += 1;
    }

    let mut counts = FrequencyTable::new();
    for artist in artists {
        let count = per_artist.get(&artist.rating_key).copied().unwrap_or(0);
        counts.add(artist.title.as_str(), count);
    }
    counts
}

#[derive(Debug)]
pub struct ArtistDistribution {
    pub top: Vec<(String, u64)>,
    pub bottom: Vec<(String, u64)>,
    pub bins: Vec<Bin>,
}

impl ArtistDistribution {
    pub fn from_counts(counts: &FrequencyTable) -> ArtistDistribution {
        let sorted = counts
            .most_common()
            .into_iter()
            .map(|(artist, count)| (artist.to_string(), count))
            .collect::<Vec<_>>();

        let values = counts.values().collect::<Vec<_>>();
        let bins = match sorted.first() {
            Some((_, max)) => histogram(&values, &artist_bin_edges(*max)),
            None => Vec::new(),
        };

        ArtistDistribution {
            top: sorted.iter().take(TOP_ARTISTS).cloned().collect(),
            bottom: sorted
                .into_iter()
                .filter(|(_, count)| *count < SMALL_ARTIST)
                .collect(),
            bins,
        }
    }

    pub fn print(&self) -> Result<()> {
        println!("{}", heading(&format!("Top {} artists by track count:", TOP_ARTISTS)));
        println!("{}", serde_json::to_string_pretty(&self.top)?);
        println!(
            "{}",
            heading(&format!("Artists with fewer than {} tracks:", SMALL_ARTIST))
        );
        println!("{}", serde_json::to_string_pretty(&self.bottom)?);

        if !self.bins.is_empty() {
            println!("{}", heading("Tracks per artist:"));
            for line in render(&self.bins) {
                println!("{}", line);
            }
        }
        Ok(())
    }
}

pub fn artist_distribution(
    library: &dyn MediaLibrary,
    library_name: &str,
) -> Result<ArtistDistribution> {
    let section = library
        .section(library_name)
        .with_context(|| format!("Opening library {}", library_name))?;

    log::info!("Loading artists and tracks");
    let artists = library.artists(&section).context("Loading artists")?;
    let tracks = library.tracks(&section).context("Loading tracks")?;
    log::info!("{} artists, {} tracks", artists.len(), tracks.len());

    let counts = artist_track_counts(&artists, &tracks);
    Ok(ArtistDistribution::from_counts(&counts))
}
