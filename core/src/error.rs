//! Error types for loading model artifacts and classifying documents.

use std::io;

use thiserror::Error;

use crate::LabelId;

/// Errors raised while loading a classifier or classifying a document.
///
/// `Load` (and the I/O and decoding conversions) only happen at startup; a classifier
/// that failed to load is never handed out. The remaining variants are per-call failures
/// and mean the loaded artifacts disagree with each other.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Missing or corrupt vocabulary, frequency table, label index or model.
    #[error("load error: {0}")]
    Load(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal inconsistency between the loaded artifacts.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("model produced no label scores")]
    NoLabelsAvailable,

    #[error("label id {0} is not in the label index")]
    UnknownLabelId(LabelId),
}

impl ClassifierError {
    pub fn load<S: Into<String>>(msg: S) -> Self {
        ClassifierError::Load(msg.into())
    }

    pub fn invalid_model<S: Into<String>>(msg: S) -> Self {
        ClassifierError::InvalidModel(msg.into())
    }

    /// True for errors that can only come out of artifact loading.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ClassifierError::Load(_)
                | ClassifierError::Io(_)
                | ClassifierError::Decode(_)
                | ClassifierError::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
