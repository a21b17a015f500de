// Copyright (c) 2026 rezky_nightky

use std::path::PathBuf;

use thiserror::Error;

/// Rejected engine tunables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{name} range is empty: [{low}, {high})")]
    EmptyRange {
        name: &'static str,
        low: f64,
        high: f64,
    },

    #[error("text threshold {text} must not exceed heart threshold {heart}")]
    ThresholdOrder { text: f64, heart: f64 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("heart glyph set is empty")]
    NoHeartGlyphs,
}

/// Failure to load a project file.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;
