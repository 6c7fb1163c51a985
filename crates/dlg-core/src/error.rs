//! Errors raised by the core crate.

use thiserror::Error;

/// The dialogue text could not be turned into scenes.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid dialogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate scene_tag `{0}`")]
    DuplicateScene(String),

    #[error("scene #{index} has an empty scene_tag")]
    EmptySceneTag { index: usize },
}

/// The scenes could not be turned into dialogue text.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialize dialogue: {0}")]
    Json(#[from] serde_json::Error),

    #[error("serialized dialogue is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// An editor configuration value is out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tabSize must be at least 1")]
    ZeroTabSize,

    #[error("fileFormatVersion must not be empty")]
    EmptyFormatVersion,
}

/// Editor settings could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// A node kind / slot combination that does not address any graph node.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("unknown command slot `{0}` (expected `open` or `close`)")]
    UnknownCommandSlot(String),

    #[error("button slot `{0}` is not an index")]
    InvalidButtonSlot(String),

    #[error("node kind `{kind}` cannot take slot {slot:?}")]
    InvalidCombination { kind: String, slot: Option<String> },
}
