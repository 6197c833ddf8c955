//! # VK Photo Bot
//!
//! A VK community bot with a small menu: it greets users, tells the time in
//! Moscow, returns the user's avatar and turns photos black and white.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod image_pipeline;
pub mod localization;
pub mod vk;
