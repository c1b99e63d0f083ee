//! Error type for file-backed operations. Parsing itself never fails;
//! these cover reading schema text and loading or saving layout files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid layout file {path}: {source}")]
    LayoutParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize layout: {0}")]
    LayoutSerialize(#[from] toml::ser::Error),
}
