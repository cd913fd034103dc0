use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading a configuration document or resolving it for a file.
///
/// None of these are transient: every variant points at an authoring mistake
/// in the configuration (or an unreadable file), so callers report them as-is.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("invalid ignore pattern {pattern}: {source}")]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: ignore::Error,
    },
    #[error("invalid rule setting for {rule}: {value}")]
    MalformedRuleSet { rule: String, value: Value },
    #[error("unknown preset {name} (referenced from {referrer})")]
    UnknownPreset { name: String, referrer: String },
    #[error("circular extends: {0}")]
    CircularPreset(String),
    #[error("invalid configuration: {0}")]
    InvalidDocument(String),
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Json(PathBuf, #[source] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    pub(crate) fn malformed(rule: &str, value: &Value) -> Self {
        Self::MalformedRuleSet {
            rule: rule.to_string(),
            value: value.clone(),
        }
    }
}

/// Errors raised while building formatter options.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Illegal setting file {0}: {1}")]
    IllegalSettingFile(PathBuf, #[source] serde_json::Error),
    #[error("Setting json is invalid: {0}")]
    InvalidSettings(#[source] serde_json::Error),
    #[error("invalid options for prettier/prettier: {0}")]
    InvalidRuleOptions(#[source] serde_json::Error),
}
