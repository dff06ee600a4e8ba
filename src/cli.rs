use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediabot")]
#[command(author, version, about = "Forum bot that replies with movie and TV details")]
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
    /// Start the webhook receiver and admin API
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Parse text, look the title up and print the reply
    Lookup {
        /// Post text, e.g. "!movie Heat (1995)"
        #[arg(required = true)]
        text: String,

        /// Topic tags used for tag-based detection
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Reply locale (defaults to the configured locale)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Parse text and print the detected lookup as JSON
    Parse {
        /// Post text to parse
        #[arg(required = true)]
        text: String,

        /// Topic tags used for tag-based detection
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,

    /// Generate a random secret for webhook signature verification
    GenerateSecret,
}
