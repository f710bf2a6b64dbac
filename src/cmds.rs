pub mod artist_distribution;
pub mod music_stats;
pub mod plex_api;
pub mod sort_playlists;
pub mod tautulli_api;
mod util;

pub use artist_distribution::{artist_distribution, ArtistDistribution};
pub use music_stats::{music_stats, StatsOptions, StatsReport};
pub use sort_playlists::{confirm_rewrite, sort_playlists, SortOptions, SortSummary};
