//! Dialogue Manager module for the image-processing state transitions

use anyhow::Result;
use futures::StreamExt;
use tracing::{debug, info};

use crate::dialogue::ConversationState;
use crate::errors::BotError;
use crate::image_pipeline::TransformKind;
use crate::localization::t;
use crate::vk::{Message, OutgoingMessage};

use super::message_handler::redirect_to_images_keyboard;
use super::BotContext;

/// Run a transform on the photos of `msg`, or wait for photos in the next message.
///
/// `transform` is given by entry commands; continuations pass `None` and use the
/// transform stored with the `Processing` state. With photos attached, every
/// produced attachment is sent as its own reply, the conversation moves to
/// `Complete` and the images keyboard is shown again. Without photos the user is
/// asked for them and the conversation stays in `Processing`.
///
/// Errors from the transform or the VK API are returned before any state change.
pub async fn process_images(
    ctx: &BotContext,
    msg: &Message,
    transform: Option<TransformKind>,
) -> Result<()> {
    let peer_id = msg.peer_id;
    let kind = match transform {
        Some(kind) => kind,
        None => ctx
            .states
            .get(peer_id)
            .await?
            .and_then(|state| state.transform())
            .ok_or(BotError::MissingTransform(peer_id))?,
    };

    let photos = msg.photos();

    if !photos.is_empty() {
        let transformer = ctx.transforms.get(kind)?;
        info!(peer_id, transform = ?kind, photos = photos.len(), "Processing photos");

        let mut attachments = transformer.apply(ctx.api.as_ref(), peer_id, photos);
        while let Some(attachment) = attachments.next().await {
            let attachment = attachment?;
            ctx.api
                .send_message(OutgoingMessage::new(peer_id).attachment(attachment))
                .await?;
        }

        ctx.states.set(peer_id, ConversationState::Complete).await?;
        debug!(peer_id, "Image processing complete");
        return redirect_to_images_keyboard(ctx, msg).await;
    }

    ctx.api
        .send_message(OutgoingMessage::new(peer_id).text(t("photos-request")))
        .await?;
    ctx.states
        .set(peer_id, ConversationState::Processing { transform: kind })
        .await?;
    debug!(peer_id, transform = ?kind, "Waiting for photos");

    Ok(())
}
