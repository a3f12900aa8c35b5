//! Validation and storage errors for the card model.

use std::path::PathBuf;

use crate::card::CardType;

/// A card or one of its fields is not well-formed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{card_type} cards require a media artifact")]
    MissingMedia { card_type: CardType },

    #[error("Card thumbnail is empty")]
    MissingThumbnail,

    #[error("Invalid card color '{value}': expected a palette color or #rrggbb")]
    InvalidColor { value: String },

    #[error("Unknown card type '{value}'")]
    UnknownCardType { value: String },

    #[error("Unknown layout style '{value}'")]
    UnknownLayout { value: String },

    #[error("Blur level {value} is outside 0..=100")]
    BlurOutOfRange { value: u8 },

    #[error("Default width must be positive")]
    ZeroWidth,

    #[error("Invalid artifact reference: {message}")]
    InvalidArtifact { message: String },
}

/// Errors raised by the defaults store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid artifact in {path}: {source}")]
    ArtifactError {
        path: PathBuf,
        source: ValidationError,
    },
}
