//! Errors surfaced by the command-line front end.

use std::io;

use thiserror::Error;

use cartograph::GraphError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}
