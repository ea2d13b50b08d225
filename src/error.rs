//! Errors surfaced at the crate boundary.
//!
//! Only loading and configuration can fail outright. Problems with a single
//! feature or ring during a build are reported as
//! [`BuildIssue`](crate::geo::BuildIssue) values instead.

use std::path::PathBuf;

/// Errors returned when loading data or configuration.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a FeatureCollection, found {0}")]
    NotACollection(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MapError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MapError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
