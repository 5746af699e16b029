use std::{io, path::PathBuf};

use thiserror::Error;

/// Fatal errors. Per-record problems in the flow log never surface here,
/// they are logged and skipped by the aggregator.
#[derive(Error, Debug)]
pub enum FlowTagError {
    /// A file could not be opened, created, read or written
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The lookup header could not be read or lacks a required column
    #[error("invalid lookup header: {0}")]
    LookupHeader(String),

    /// Two rows of the lookup table map the same port/protocol pair (strict mode only)
    #[error("duplicate lookup mapping for port '{port}' and protocol '{protocol}' on line {line}")]
    DuplicateMapping {
        port: String,
        protocol: String,
        line: u64,
    },

    /// A structurally broken CSV row or a failure of the CSV layer itself
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FlowTagError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FlowTagError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowTagError>;
