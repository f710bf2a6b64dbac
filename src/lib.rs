//! Listening statistics and playlist upkeep for a Plex music library, with
//! play history from Tautulli.

pub mod cmds;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod histogram;
pub mod media;
pub mod ranking;
pub mod session;

pub use error::{Error, Result};
