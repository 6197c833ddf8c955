//! Bot module for handling VK messages
//!
//! This module is split into several submodules:
//! - `dispatcher`: Ordered rules choosing a handler for each message
//! - `message_handler`: Handlers for greetings, time, avatar and keyboard navigation
//! - `dialogue_manager`: Image-processing state transitions
//! - `ui_builder`: Static keyboards and their payloads

use std::sync::Arc;

use crate::dialogue::StateStore;
use crate::image_pipeline::TransformRegistry;
use crate::vk::VkApi;

pub mod dialogue_manager;
pub mod dispatcher;
pub mod message_handler;
pub mod ui_builder;

pub use dialogue_manager::process_images;
pub use dispatcher::{Dispatcher, Route, Rule};
pub use ui_builder::{images_keyboard, main_keyboard};

/// Dependencies shared by every handler
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<dyn VkApi>,
    pub states: Arc<dyn StateStore>,
    pub transforms: Arc<TransformRegistry>,
}

impl BotContext {
    pub fn new(
        api: Arc<dyn VkApi>,
        states: Arc<dyn StateStore>,
        transforms: Arc<TransformRegistry>,
    ) -> Self {
        Self {
            api,
            states,
            transforms,
        }
    }
}
