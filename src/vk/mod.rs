//! VK API integration
//!
//! - `types`: message, photo, keyboard and long poll models
//! - `client`: the `VkApi` trait and its reqwest implementation
//! - `long_poll`: Bots Long Poll event loop feeding the dispatcher

pub mod client;
pub mod long_poll;
pub mod types;

pub use client::{VkApi, VkClient};
pub use types::{Keyboard, Message, OutgoingMessage, Photo, PhotoSize, User};
