use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use plex_tools::cmds::{
    artist_distribution, confirm_rewrite, music_stats, sort_playlists, SortOptions, StatsOptions,
};
use plex_tools::config::Config;
use plex_tools::diagnostics::LogSink;
use plex_tools::ranking::DEFAULT_TOP_N;
use plex_tools::session::{plex_session, tautulli_session, ServerTarget};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "plex-tools")]
#[command(about = "Listening stats and playlist upkeep for a Plex music library", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Playlist order config (default: ~/.config/plex-tools/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ServerArgs {
    /// Connect to servers running on this machine
    #[arg(long)]
    local: bool,

    /// Hostname of the servers when not local
    #[arg(long)]
    host: Option<String>,
}

impl ServerArgs {
    fn target(&self) -> Result<ServerTarget> {
        Ok(ServerTarget::from_flags(self.local, self.host.as_deref())?)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Listening report: time played, top tracks, albums, artists, styles and genres
    MusicStats {
        /// Tautulli user to report on
        user: String,
        plex_api_key: String,
        tautulli_api_key: String,

        #[command(flatten)]
        server: ServerArgs,

        #[arg(long, default_value = "Music")]
        library_name: String,

        /// Number of places per ranking
        #[arg(long, default_value_t = DEFAULT_TOP_N, value_parser = parse_top_n)]
        top_n: usize,

        /// Days of history to report on
        #[arg(long, default_value_t = 365)]
        days: u32,
    },

    /// Biggest artists, smallest artists and a histogram of tracks per artist
    ArtistDistribution {
        api_key: String,

        #[command(flatten)]
        server: ServerArgs,

        #[arg(long, default_value = "Music")]
        library_name: String,
    },

    /// Re-create curated playlists in their configured order
    SortPlaylists {
        api_key: String,

        #[command(flatten)]
        server: ServerArgs,

        /// Print the new order without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Don't ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

fn parse_top_n(arg: &str) -> std::result::Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Skipped ranking entries are only interesting when debugging.
    let log_level = if cli.verbose {
        "debug"
    } else {
        "info,plex_tools::diagnostics=warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let diagnostics = LogSink::default();

    match cli.command {
        Command::MusicStats {
            user,
            plex_api_key,
            tautulli_api_key,
            server,
            library_name,
            top_n,
            days,
        } => {
            let target = server.target()?;
            let plex = plex_session(&plex_api_key, &target).context("Connecting to Plex")?;
            let tautulli =
                tautulli_session(&tautulli_api_key, &target).context("Connecting to Tautulli")?;

            let since = Local::now()
                .date_naive()
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN);
            let options = StatsOptions {
                user: &user,
                library_name: &library_name,
                top_n,
                days,
                since,
            };

            let report = music_stats(&plex, &tautulli, &options, &diagnostics)?;
            report.print();
        }
        Command::ArtistDistribution {
            api_key,
            server,
            library_name,
        } => {
            let plex = plex_session(&api_key, &server.target()?).context("Connecting to Plex")?;
            artist_distribution(&plex, &library_name)?.print()?;
        }
        Command::SortPlaylists {
            api_key,
            server,
            dry_run,
            yes,
        } => {
            let config = Config::load(cli.config.as_deref()).context("Loading config")?;
            let plex = plex_session(&api_key, &server.target()?).context("Connecting to Plex")?;

            if !dry_run && !yes && !confirm_rewrite(&config)? {
                println!("No playlists changed.");
                return Ok(());
            }

            let summary =
                sort_playlists(&plex, &plex, &config, SortOptions { dry_run }, &diagnostics)?;
            log::info!(
                "{} sorted, {} already in order, {} skipped",
                summary.sorted.len(),
                summary.unchanged.len(),
                summary.skipped.len()
            );
        }
    }

    Ok(())
}
