//! CLI subcommands.

pub mod env_switch;
pub mod verify_config;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Reading or writing a file failed.
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.env` file could not be parsed.
    #[error("Failed to parse {path}: {source}")]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    /// One or more verification checks failed.
    #[error("{failed} configuration check(s) failed")]
    VerificationFailed { failed: usize },
}

/// Parse a `.env` file into an ordered map.
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>, CommandError> {
    let to_error = |source| CommandError::Dotenv {
        path: path.to_path_buf(),
        source,
    };
    dotenvy::from_path_iter(path)
        .map_err(to_error)?
        .collect::<Result<BTreeMap<_, _>, _>>()
        .map_err(to_error)
}
