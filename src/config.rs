//! Playlist sort orders, optionally read from a TOML file.
//!
//! ```toml
//! [[order]]
//! keys = ["ARTIST", "RATING"]
//! playlists = ["Running", "Workout"]
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortKey {
    Artist,
    Album,
    Rating,
}

/// Playlists that share one sort order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistOrder {
    pub keys: Vec<SortKey>,
    pub playlists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "order", default = "default_orders")]
    pub orders: Vec<PlaylistOrder>,
}

/// Curated playlists are expected to be fully rated.
fn default_orders() -> Vec<PlaylistOrder> {
    vec![
        PlaylistOrder {
            keys: vec![SortKey::Artist, SortKey::Rating],
            playlists: ["Love Songs", "Openings", "Running", "Singing", "Workout"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        },
        PlaylistOrder {
            keys: vec![SortKey::Rating],
            playlists: vec!["Played".to_string()],
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            orders: default_orders(),
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Config> {
        Ok(toml::from_str(text)?)
    }

    /// `~/.config/plex-tools/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME")?;
        Some(
            Path::new(&home)
                .join(".config")
                .join("plex-tools")
                .join("config.toml"),
        )
    }

    /// Reads `path`, or the default location when none is given. A missing
    /// default file yields the built-in orders; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Config::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file, using built-in playlist orders");
                    return Ok(Config::default());
                }
            },
        };

        log::debug!("Loading config from {}", path.display());
        let text = fs::read_to_string(&path)?;
        Config::parse(&text)
    }
}
