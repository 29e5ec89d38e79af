//! Error taxonomy for scene analysis and QA generation
//!
//! Insufficient-data conditions (too few objects, unresolved roles) are not
//! errors: analyzers degrade to unresolved records and synthesizers to empty
//! output. The variants below cover boundary parsing and orchestrator I/O.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced at the boundary of the causal scene pipeline
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Causal graph violation: {0}")]
    GraphViolation(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SceneError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
