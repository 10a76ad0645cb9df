//! Vitrina CLI - Environment and configuration tools.
//!
//! # Usage
//!
//! ```bash
//! # Write .env for an environment profile (region defaults to colombia)
//! vitrina-cli env-switch development
//! vitrina-cli env-switch testing argentina
//!
//! # Show the environment the current .env selects
//! vitrina-cli env-status
//!
//! # Check .env files and critical variables
//! vitrina-cli verify-config --path .
//! ```
//!
//! # Commands
//!
//! - `env-switch` - Generate `.env` from the built-in profile table
//! - `env-status` - Summarize the current `.env`
//! - `verify-config` - Report pass/fail for files and critical variables

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vitrina_storefront::config::{Environment, Region};

mod commands;

#[derive(Parser)]
#[command(name = "vitrina-cli")]
#[command(author, version, about = "Vitrina CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write .env for an environment profile and region
    EnvSwitch {
        /// development, production, testing or local
        environment: Environment,

        /// colombia, argentina, mexico, brazil or chile
        #[arg(default_value = "colombia")]
        region: Region,

        /// Directory the .env file is written to
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Summarize the current .env
    EnvStatus {
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Verify configuration files and critical variables
    VerifyConfig {
        /// Project root to check
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::EnvSwitch {
            environment,
            region,
            dir,
        } => {
            commands::env_switch::show_status(&dir);
            commands::env_switch::switch(environment, region, &dir)?;
        }
        Commands::EnvStatus { dir } => commands::env_switch::show_status(&dir),
        Commands::VerifyConfig { path } => commands::verify_config::run(&path)?,
    }
    Ok(())
}
