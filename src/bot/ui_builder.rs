//! UI Builder module for the bot keyboards

use serde_json::{json, Value};
use std::sync::LazyLock;

use crate::localization::t;
use crate::vk::types::{Button, ButtonColor, Keyboard};

/// Keyboard names carried in `{"keyboard": ...}` payloads
pub const MAIN_KEYBOARD_NAME: &str = "main";
pub const IMAGES_KEYBOARD_NAME: &str = "images";

static MAIN_KEYBOARD: LazyLock<Keyboard> = LazyLock::new(create_main_keyboard);
static IMAGES_KEYBOARD: LazyLock<Keyboard> = LazyLock::new(create_images_keyboard);

/// Payload switching to the named keyboard
pub fn keyboard_payload(name: &str) -> Value {
    json!({ "keyboard": name })
}

/// Payload invoking the named command
pub fn command_payload(name: &str) -> Value {
    json!({ "command": name })
}

/// Top-level menu
pub fn main_keyboard() -> &'static Keyboard {
    &MAIN_KEYBOARD
}

/// Image tools menu
pub fn images_keyboard() -> &'static Keyboard {
    &IMAGES_KEYBOARD
}

fn create_main_keyboard() -> Keyboard {
    Keyboard {
        one_time: false,
        inline: false,
        buttons: vec![vec![
            Button::text(
                t("button-images"),
                &keyboard_payload(IMAGES_KEYBOARD_NAME),
                ButtonColor::Positive,
            ),
            Button::text(t("button-time"), &command_payload("time"), ButtonColor::Secondary),
        ]],
    }
}

fn create_images_keyboard() -> Keyboard {
    Keyboard {
        one_time: false,
        inline: false,
        buttons: vec![
            vec![
                Button::text(
                    t("button-monochrome"),
                    &command_payload("monochrome"),
                    ButtonColor::Secondary,
                ),
                Button::text(
                    t("button-avatar"),
                    &command_payload("avatar"),
                    ButtonColor::Secondary,
                ),
            ],
            vec![Button::text(
                t("button-back"),
                &keyboard_payload(MAIN_KEYBOARD_NAME),
                ButtonColor::Negative,
            )],
        ],
    }
}
