//! Subcommand implementations.

pub mod sync;
pub mod themes;

use serde::Serialize;
use shop_sync_dashboard::SyncError;
use thiserror::Error;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Could not encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// The run completed but some items failed.
    #[error("{0} item(s) failed to sync")]
    ItemsFailed(usize),
}

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as pretty JSON, or the lines `human` produces.
    #[allow(clippy::print_stdout)]
    pub fn emit<T, F>(self, value: &T, human: F) -> Result<(), CommandError>
    where
        T: Serialize,
        F: FnOnce(&T) -> Vec<String>,
    {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            for line in human(value) {
                println!("{line}");
            }
        }
        Ok(())
    }
}
