//! UserDB CLI
//!
//! Command-line tools for user dictionary stores.
//!
//! # Commands
//!
//! - `backup` - Write a store to a snapshot file
//! - `restore` - Load a snapshot file into a store
//! - `merge` - Merge another replica (store or snapshot) into a store
//! - `import` - Absorb a bundled word list into a store
//! - `inspect` - Display store metadata and record counts

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use userdb_core::{ErrorPolicy, UserDbConfig};

/// UserDB command-line store tools.
#[derive(Parser)]
#[command(name = "userdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Identity recorded after a merge (defaults to the store's own)
    #[arg(global = true, long)]
    user_id: Option<String>,

    /// Stop at the first record that fails to apply
    #[arg(global = true, long)]
    abort_on_error: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the store to a snapshot file (`.userdb.txt` for plain text)
    Backup {
        /// Snapshot file to create
        output: PathBuf,
    },

    /// Load a snapshot file into the store, overwriting matching keys
    Restore {
        /// Snapshot file to read
        input: PathBuf,
    },

    /// Merge another replica into the store
    Merge {
        /// Snapshot file or store file of the other replica
        source: PathBuf,
    },

    /// Absorb a bundled word list into the store
    Import {
        /// Snapshot file or store file holding the word list
        source: PathBuf,
    },

    /// Display store metadata and record counts
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = UserDbConfig::new();
    if let Some(user_id) = &cli.user_id {
        config = config.with_user_id(user_id.clone());
    }
    if cli.abort_on_error {
        config = config.with_error_policy(ErrorPolicy::Abort);
    }

    match cli.command {
        Commands::Backup { output } => {
            let path = cli.path.ok_or("Store path required for backup")?;
            commands::backup::create(&path, &output, &config)?;
        }
        Commands::Restore { input } => {
            let path = cli.path.ok_or("Store path required for restore")?;
            commands::backup::restore(&path, &input, &config)?;
        }
        Commands::Merge { source } => {
            let path = cli.path.ok_or("Store path required for merge")?;
            commands::merge::merge(&path, &source, &config, cli.user_id.as_deref())?;
        }
        Commands::Import { source } => {
            let path = cli.path.ok_or("Store path required for import")?;
            commands::merge::import(&path, &source, &config)?;
        }
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Version => {
            println!("UserDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("UserDB Core v{}", userdb_core::VERSION);
        }
    }

    Ok(())
}
