//! # Bot Error Types Module
//!
//! This module defines the error types raised by the VK client, the image
//! pipeline and the image-processing dialogue. Handlers return
//! `anyhow::Result` and these errors travel inside it.

use crate::image_pipeline::TransformKind;

/// Custom error types for bot operations
#[derive(Debug, Clone, PartialEq)]
pub enum BotError {
    /// Missing or malformed configuration value
    Config(String),
    /// VK API returned an `error` object
    Api { code: i64, message: String },
    /// Response body could not be interpreted
    Decode(String),
    /// Long poll server reported an unknown failure
    LongPoll(String),
    /// Photo attachment carries no size variants
    NoPhotoSizes(i64),
    /// Message timestamp outside the representable range
    InvalidTimestamp(i64),
    /// Continuation requested but no transform is stored for the peer
    MissingTransform(i64),
    /// Transform kind has no registered implementation
    UnregisteredTransform(TransformKind),
}

impl std::fmt::Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BotError::Api { code, message } => write!(f, "VK API error {code}: {message}"),
            BotError::Decode(msg) => write!(f, "Decode error: {msg}"),
            BotError::LongPoll(msg) => write!(f, "Long poll error: {msg}"),
            BotError::NoPhotoSizes(photo_id) => {
                write!(f, "Photo {photo_id} has no size variants")
            }
            BotError::InvalidTimestamp(ts) => write!(f, "Invalid message timestamp: {ts}"),
            BotError::MissingTransform(peer_id) => {
                write!(f, "No transform stored for peer {peer_id}")
            }
            BotError::UnregisteredTransform(kind) => {
                write!(f, "Transform {kind:?} is not registered")
            }
        }
    }
}

impl std::error::Error for BotError {}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Decode(err.to_string())
    }
}
