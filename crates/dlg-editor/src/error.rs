//! Errors raised by the editor engine.

use dlg_core::{ConfigError, ParseError, SceneId, SlotError};
use thiserror::Error;

/// The store's order sequence and scene mapping disagree.
///
/// This is never expected in correct operation; it signals a defect in the
/// store or in how it is driven, not a recoverable condition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("integrity failure: `{0}` is ordered but not stored")]
    MissingScene(SceneId),

    #[error("integrity failure: `{0}` is stored but not ordered")]
    UnorderedScene(SceneId),
}

/// The text document rejected a write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("document rejected the edit: {0}")]
    Rejected(String),
}

/// Persisted layout state could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to decode layout state: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("failed to encode layout state: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
}

/// Setting a node position addressed by loosely-typed parts failed.
#[derive(Debug, Error)]
pub enum LayoutStateError {
    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    State(#[from] StateError),
}

/// A sync session operation failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("scene id must not be empty")]
    EmptySceneId,

    #[error("message addresses `{message_id}` but carries scene `{scene_id}`")]
    SceneIdMismatch { message_id: SceneId, scene_id: SceneId },
}
