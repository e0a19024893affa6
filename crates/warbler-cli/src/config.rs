//! Command-line arguments and runtime configuration for the `warbler` binary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://warbler.db";

/// Command-line front end for the Warbler account and social-graph store.
///
/// Configuration can be set via CLI arguments or environment variables
/// (a `.env` file is honoured). CLI arguments take precedence.
#[derive(Parser, Debug)]
#[command(name = "warbler", version, about)]
pub struct Cli {
    /// Database connection string [env: DATABASE_URL] [default: sqlite://warbler.db]
    #[arg(long, short = 'd', global = true)]
    pub database_url: Option<String>,

    /// Maximum number of messages in a feed [env: WARBLER_FEED_LIMIT] [default: 100]
    #[arg(long, global = true)]
    pub feed_limit: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create the schema if it does not exist yet
    Migrate,
    /// Drop every table and recreate the schema
    Reset,
    /// Create an account
    Signup {
        username: String,
        email: String,
        #[arg(long, short = 'p')]
        password: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Check a username and password
    Login { username: String, password: String },
    /// Post a message as a user
    Post { username: String, text: String },
    /// Delete a message
    DeleteMessage { id: i64 },
    /// Make `username` follow `target`
    Follow { username: String, target: String },
    /// Make `username` stop following `target`
    Unfollow { username: String, target: String },
    /// Like or unlike a message
    Like { username: String, message_id: i64 },
    /// List a user's likes
    Likes { username: String },
    /// Show a user's home feed
    Feed { username: String },
    /// Show a user's profile, counts, messages and connections
    Show { username: String },
    /// List users, optionally filtered by a username substring
    Users {
        #[arg(long, short = 'q')]
        query: Option<String>,
    },
    /// Update profile fields
    EditProfile {
        username: String,
        #[arg(long)]
        new_username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        header_image_url: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete a user and everything they own
    DeleteUser { username: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub feed_limit: u32,
}

impl Config {
    pub fn from_cli_and_env(cli: &Cli) -> Result<Self> {
        Self::resolve(cli.database_url.clone(), cli.feed_limit, |key| {
            std::env::var(key).ok()
        })
    }

    /// CLI value, then `env`, then the default.
    pub fn resolve<F>(database_url: Option<String>, feed_limit: Option<u32>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = database_url
            .or_else(|| env("DATABASE_URL"))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let feed_limit = match feed_limit {
            Some(limit) => limit,
            None => match env("WARBLER_FEED_LIMIT") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid WARBLER_FEED_LIMIT: {raw:?}"))?,
                None => warbler_db::queries::DEFAULT_FEED_LIMIT,
            },
        };

        Ok(Self {
            database_url,
            feed_limit,
        })
    }
}
