//! Error taxonomy for the headline pipeline.
//!
//! Only conditions that stop a stage from running at all are errors. A page
//! that parses fine but has no news container, or an item without a link or
//! timestamp, is an empty or partial result and never shows up here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure or a non-success HTTP status.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The extraction traversal could not run (e.g. a schema selector does not compile).
    #[error("parse error: {0}")]
    Parse(String),

    #[error("export error writing {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The sentiment classifier was unavailable, rejected its input or timed out.
    #[error("annotation error: {0}")]
    Annotation(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
