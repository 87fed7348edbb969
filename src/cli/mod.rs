//! oddsline CLI
//!
//! Thin consumer of [`OddsClient`](crate::client::OddsClient): fetch odds,
//! live events and scores, manage the provider key and per-sport settings,
//! and poll a sport at its configured cadence.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// Sports odds client with caching and request throttling
#[derive(Parser, Debug)]
#[command(name = "oddsline")]
#[command(author, version, about = "Cached, throttled sports odds client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (default.toml, <ODDSLINE_ENV>.toml)
    #[arg(short, long, global = true, default_value = "config")]
    pub config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List sports offered by the provider
    Sports,
    /// Upcoming odds for a sport
    Odds {
        sport: String,
        /// Bookmaker region (defaults to provider.region)
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Live odds for a sport
    Live { sport: String },
    /// Recent and live scores for a sport
    Scores {
        sport: String,
        /// Days of completed games to include
        #[arg(long)]
        days_from: Option<u32>,
    },
    /// Verify and store a provider API key (prompts when omitted)
    SetKey { key: Option<String> },
    /// Enable/disable a sport and set its refresh interval
    SetSport {
        sport: String,
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
        /// Refresh interval in seconds
        #[arg(long, default_value = "30")]
        interval: u32,
    },
    /// Show client configuration and request statistics
    Status,
    /// Poll a sport until interrupted
    Watch {
        sport: String,
        /// odds, live or scores
        #[arg(short, long, default_value = "odds")]
        kind: String,
    },
}
