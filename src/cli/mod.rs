//! Command line interface for gator.

pub mod handlers;
pub mod state;

pub use state::State;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::Result;

#[derive(Debug, Parser)]
#[command(name = "gator")]
#[command(about = "Follow RSS feeds and collect their posts", long_about = None)]
pub struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, default_value = "gator.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create a user and log in as them
    Register { name: String },
    /// Switch the active user
    Login { name: String },
    /// List all users
    Users,
    /// Delete all users, feeds, follows and posts
    Reset,
    /// Add a feed and follow it
    Addfeed { name: String, url: String },
    /// List all feeds
    Feeds,
    /// Follow an existing feed
    Follow { url: String },
    /// List followed feeds
    Following,
    /// Stop following a feed
    Unfollow { url: String },
    /// Show the newest posts from followed feeds
    Browse { limit: Option<i64> },
    /// Collect feeds until interrupted
    Agg {
        /// Time between requests, e.g. "1m" or "30s"
        interval: Option<String>,
    },
}

impl Command {
    /// The command name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register { .. } => "register",
            Command::Login { .. } => "login",
            Command::Users => "users",
            Command::Reset => "reset",
            Command::Addfeed { .. } => "addfeed",
            Command::Feeds => "feeds",
            Command::Follow { .. } => "follow",
            Command::Following => "following",
            Command::Unfollow { .. } => "unfollow",
            Command::Browse { .. } => "browse",
            Command::Agg { .. } => "agg",
        }
    }
}

/// Run `command`, writing its output to `out`.
///
/// `agg` runs until Ctrl-C.
pub async fn dispatch<W: Write>(state: &mut State, command: Command, out: &mut W) -> Result<()> {
    match command {
        Command::Register { name } => handlers::register(state, &name, out).await,
        Command::Login { name } => handlers::login(state, &name, out).await,
        Command::Users => handlers::users(state, out).await,
        Command::Reset => handlers::reset(state, out).await,
        Command::Addfeed { name, url } => handlers::add_feed(state, &name, &url, out).await,
        Command::Feeds => handlers::feeds(state, out).await,
        Command::Follow { url } => handlers::follow(state, &url, out).await,
        Command::Following => handlers::following(state, out).await,
        Command::Unfollow { url } => handlers::unfollow(state, &url, out).await,
        Command::Browse { limit } => handlers::browse(state, limit, out).await,
        Command::Agg { interval } => {
            handlers::agg(state, interval.as_deref(), out, shutdown_signal()).await
        }
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addfeed() {
        let cli = Cli::parse_from(["gator", "addfeed", "HN", "https://news.ycombinator.com/rss"]);
        assert_eq!(cli.config, PathBuf::from("gator.toml"));
        match cli.command {
            Command::Addfeed { name, url } => {
                assert_eq!(name, "HN");
                assert_eq!(url, "https://news.ycombinator.com/rss");
            }
            other => panic!("Expected Addfeed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_flag_and_optional_args() {
        let cli = Cli::parse_from(["gator", "--config", "/tmp/g.toml", "browse"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/g.toml"));
        assert!(matches!(cli.command, Command::Browse { limit: None }));

        let cli = Cli::parse_from(["gator", "agg", "30s"]);
        assert!(matches!(cli.command, Command::Agg { interval: Some(ref i) } if i == "30s"));
    }

    #[test]
    fn test_parse_rejects_missing_argument() {
        assert!(Cli::try_parse_from(["gator", "login"]).is_err());
        assert!(Cli::try_parse_from(["gator", "browse", "many"]).is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Users.name(), "users");
        assert_eq!(Command::Agg { interval: None }.name(), "agg");
    }
}
