use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inneapp")]
#[command(author, version, about = "Therapy session booking application")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `start`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web application
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending schema migrations, or roll back to a version
    Migrate {
        /// Revert every migration newer than this version
        #[arg(long, value_name = "VERSION")]
        down_to: Option<i64>,
    },

    /// Show applied migrations and row counts
    Status,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config or defaults if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
