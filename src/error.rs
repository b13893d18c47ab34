//! Error taxonomy for flymake.
//!
//! Every failure a command can hit maps to one of these kinds. Errors
//! propagate unchanged to the command dispatch layer, which prints them and
//! exits with status 1. No retry or recovery is attempted anywhere.

use crate::config::ManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid path `{0}`")]
    BadPath(String),

    #[error("'{0}' is not a valid program")]
    BadProg(String),

    #[error("no source files in folder {0}")]
    NoFiles(String),

    #[error("path `{0}` does not appear to be in a project or is empty")]
    NotProject(String),

    #[error("'{0}' not in same root")]
    NotSameRoot(String),

    #[error("no rule to make target {0}")]
    NoRule(String),

    #[error("could not git clone {0}")]
    CloneFailed(String),

    #[error("cannot write to file/folder {0}")]
    Write(String),

    /// Manifest parse or validation failure. Prints a file:line:col header,
    /// the offending line and a caret, with no generic prefix.
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The detecting site already printed a tailored message; the top-level
    /// printer stays quiet and only the exit status reports the failure.
    #[error("")]
    Silent,
}

pub type Result<T> = std::result::Result<T, Error>;
