//! Image-processing dialogue state, kept per conversation.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::image_pipeline::TransformKind;

/// Represents where a conversation is in the image-processing flow.
/// A conversation without a stored state is idle, same as `Complete`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversationState {
    /// Waiting for photos to run `transform` on
    Processing { transform: TransformKind },
    Complete,
}

/// Discriminant of [`ConversationState`], used by state-matching routes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    Processing,
    Complete,
}

impl ConversationState {
    pub fn kind(&self) -> StateKind {
        match self {
            ConversationState::Processing { .. } => StateKind::Processing,
            ConversationState::Complete => StateKind::Complete,
        }
    }

    /// Transform awaiting photos, if any
    pub fn transform(&self) -> Option<TransformKind> {
        match self {
            ConversationState::Processing { transform } => Some(*transform),
            ConversationState::Complete => None,
        }
    }
}

/// Per-conversation state storage keyed by peer id
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, peer_id: i64) -> Result<Option<ConversationState>>;

    /// Overwrite the state of `peer_id`
    async fn set(&self, peer_id: i64, state: ConversationState) -> Result<()>;
}

/// Process-local state store; contents are lost on restart
#[derive(Debug, Default)]
pub struct InMemStateStore {
    states: Mutex<HashMap<i64, ConversationState>>,
}

impl InMemStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemStateStore {
    async fn get(&self, peer_id: i64) -> Result<Option<ConversationState>> {
        Ok(self.states.lock().await.get(&peer_id).cloned())
    }

    async fn set(&self, peer_id: i64, state: ConversationState) -> Result<()> {
        self.states.lock().await.insert(peer_id, state);
        Ok(())
    }
}
