//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using the
//! `clap` crate. Global options are merged into the configuration as the
//! highest-priority `figment` provider; subcommands pick what to run.

use clap::{Parser, Subcommand};
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Push notifications for shared household finances.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (overrides `log_level`).
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Path to the JSON membership snapshot (overrides `store.members_path`).
    #[arg(long, value_name = "FILE", global = true)]
    pub members: Option<PathBuf>,

    /// Log pushes instead of sending them, whatever the configured transport.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the HTTP trigger server (the default).
    Serve {
        /// Address to listen on (overrides `server.listen_addr`).
        #[arg(long, value_name = "ADDR")]
        listen: Option<SocketAddr>,
    },
    /// Notify a household about a new contribution.
    Contribution {
        #[arg(long)]
        household: String,
        /// The contribution record id.
        #[arg(long)]
        id: String,
        /// uid of the contributing member.
        #[arg(long)]
        by: String,
        #[arg(long)]
        by_display_name: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
    /// Notify a household about a new expense.
    Expense {
        #[arg(long)]
        household: String,
        /// The expense record id.
        #[arg(long)]
        id: String,
        /// uid of the spending member.
        #[arg(long)]
        by: String,
        #[arg(long)]
        by_display_name: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long)]
        category_id: String,
        #[arg(long)]
        category_name: String,
    },
    /// Announce a month closure to every member of a household.
    CloseMonth {
        #[arg(long)]
        household: String,
        /// Period label, e.g. 2024-05.
        #[arg(long)]
        month: String,
        #[arg(long, allow_negative_numbers = true)]
        carry_over: f64,
        /// uid of the authenticated member requesting the closure notice.
        #[arg(long)]
        caller_uid: Option<String>,
    },
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(path) = &self.members {
            dict.insert(
                "store".into(),
                section("members_path", Value::from(path.display().to_string())),
            );
        }

        if self.dry_run {
            dict.insert("transport".into(), section("kind", Value::from("Log")));
        }

        if let Some(Command::Serve {
            listen: Some(addr),
        }) = &self.command
        {
            dict.insert(
                "server".into(),
                section("listen_addr", Value::from(addr.to_string())),
            );
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

/// Wraps a single key/value pair into a nested table.
fn section(key: &str, value: Value) -> Value {
    let mut table = Dict::new();
    table.insert(key.into(), value);
    Value::Dict(Tag::Default, table)
}
