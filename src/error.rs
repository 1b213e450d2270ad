//! Unified error types.
//!
//! None of these are fatal to a page session: the shell logs them and keeps
//! the router, search broadcaster and overlay manager usable.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid API url {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("server answered with status {status}")]
    Status { status: u16 },

    #[error("could not decode response body: {0}")]
    Decode(String),

    #[error("api client is no longer running")]
    Disconnected,

    #[error("no scripted response for {method} {path}")]
    Unscripted { method: String, path: String },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected {found:?} at offset {offset} in selector")]
    Unexpected { found: char, offset: usize },

    #[error("unterminated attribute selector")]
    UnterminatedAttribute,
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unexpected response shape for {what}")]
    Shape { what: &'static str },

    #[error("container {0} is not mounted")]
    MissingContainer(String),

    #[error("view is not on screen")]
    Detached,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no route matches {0} and no default route is registered")]
    NoRoute(String),
}
