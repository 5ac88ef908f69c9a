use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "streamgate")]
#[command(author, version, about = "Token-gated media playback")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an interactive player session gated by continuous validation
    Watch {
        /// Access token for the session (empty denies access)
        #[arg(long, default_value = "")]
        token: String,

        /// Username shown next to the player
        #[arg(long)]
        username: Option<String>,

        /// Initial navigable location (overrides client.location)
        #[arg(long)]
        location: Option<String>,

        /// Length of the simulated media in seconds
        #[arg(long, default_value = "596")]
        duration: f64,
    },

    /// Send a single validation request and print the verdict
    Check {
        /// Access token to validate
        #[arg(long, default_value = "")]
        token: String,

        /// Origin address to claim (defaults to origin.default_address)
        #[arg(long)]
        ip: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
