//! Message Handler module with one handler per user intent

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info};

use crate::errors::BotError;
use crate::image_pipeline::TransformKind;
use crate::localization::{t, t_args};
use crate::vk::{Keyboard, Message, OutgoingMessage};

use super::dialogue_manager::process_images;
use super::ui_builder::{images_keyboard, main_keyboard};
use super::BotContext;

/// Words that open the main menu when found anywhere in a private message
pub const GREETING_KEYWORDS: [&str; 4] = ["привет", "начать", "помощь", "меню"];

/// Moscow is UTC+3 all year round
pub const MOSCOW_UTC_OFFSET_SECS: i32 = 3 * 3600;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Reply with the navigation prompt and attach `keyboard`
pub async fn return_to_keyboard(
    ctx: &BotContext,
    msg: &Message,
    keyboard: &Keyboard,
) -> Result<()> {
    ctx.api
        .send_message(
            OutgoingMessage::new(msg.peer_id)
                .text(t("navigation-prompt"))
                .keyboard(keyboard.clone()),
        )
        .await?;
    Ok(())
}

pub async fn redirect_to_main_keyboard(ctx: &BotContext, msg: &Message) -> Result<()> {
    return_to_keyboard(ctx, msg, main_keyboard()).await
}

pub async fn redirect_to_images_keyboard(ctx: &BotContext, msg: &Message) -> Result<()> {
    return_to_keyboard(ctx, msg, images_keyboard()).await
}

/// Private message mentioning one of the greeting keywords
pub fn is_greeting(msg: &Message) -> bool {
    if !msg.is_private() || msg.text.is_empty() {
        return false;
    }
    let text = msg.text.to_lowercase();
    GREETING_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

pub async fn handle_greeting(ctx: &BotContext, msg: &Message) -> Result<()> {
    let user = ctx.api.get_user(msg.from_id, &[]).await?;
    info!(peer_id = msg.peer_id, user_id = user.id, "Greeting user");

    ctx.api
        .send_message(
            OutgoingMessage::new(msg.peer_id)
                .text(t_args("greeting", &[("name", user.first_name.as_str())]))
                .keyboard(main_keyboard().clone()),
        )
        .await?;
    Ok(())
}

/// Wall-clock time of `timestamp` in Moscow, formatted `HH:MM:SS`
pub fn format_moscow_time(timestamp: i64) -> Result<String, BotError> {
    let offset = FixedOffset::east_opt(MOSCOW_UTC_OFFSET_SECS)
        .ok_or(BotError::InvalidTimestamp(timestamp))?;
    let time = DateTime::from_timestamp(timestamp, 0).ok_or(BotError::InvalidTimestamp(timestamp))?;
    Ok(time.with_timezone(&offset).format(TIME_FORMAT).to_string())
}

pub async fn handle_time_request(ctx: &BotContext, msg: &Message) -> Result<()> {
    // The reply always uses Moscow time; the profile timezone is only logged
    let user = ctx.api.get_user(msg.from_id, &["timezone"]).await?;
    debug!(user_id = user.id, timezone = ?user.timezone, "User timezone");

    let time = format_moscow_time(msg.date)?;
    let reply = t_args("time-now", &[("time", time.as_str())]);
    ctx.api
        .send_message(OutgoingMessage::new(msg.peer_id).text(reply))
        .await?;
    Ok(())
}

pub async fn handle_avatar_request(ctx: &BotContext, msg: &Message) -> Result<()> {
    let user = ctx.api.get_user(msg.from_id, &["photo_id"]).await?;

    let reply = match user.photo_id.as_deref().filter(|id| !id.is_empty()) {
        Some(photo_id) => OutgoingMessage::new(msg.peer_id).attachment(format!("photo{photo_id}")),
        None => {
            debug!(user_id = user.id, "User has no avatar");
            OutgoingMessage::new(msg.peer_id).text(t("avatar-missing"))
        }
    };

    ctx.api.send_message(reply).await?;
    Ok(())
}

/// Entry point of the grayscale flow
pub async fn handle_monochrome(ctx: &BotContext, msg: &Message) -> Result<()> {
    process_images(ctx, msg, Some(TransformKind::Monochrome)).await
}
