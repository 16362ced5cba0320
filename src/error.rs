//! Error types for classification, emission and the file driver.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to classify or emit a single command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Wrong word count, unknown operator, bad number or bad symbol.
    #[error("malformed command: {0}")]
    Malformed(String),

    /// Unknown segment, out-of-range index, or a pop into `constant`.
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
}

/// A [`CommandError`] located at a source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: `{text}`: {source}")]
pub struct LineError {
    pub line: usize,
    pub text: String,
    #[source]
    pub source: CommandError,
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("{unit}: {source}")]
    Unit {
        unit: String,
        #[source]
        source: LineError,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0} is neither a .vm file nor a directory")]
    UnsupportedInput(PathBuf),

    #[error("no .vm files found in {0}")]
    NoSourceFiles(PathBuf),
}

impl TranslateError {
    /// The underlying command error, if this failure came from a source line.
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            TranslateError::Unit { source, .. } => Some(&source.source),
            _ => None,
        }
    }
}
