//! # Image Pipeline Module
//!
//! Photo transforms applied by the image-processing dialogue. A transform
//! consumes the photos of one message and lazily yields one uploaded
//! attachment reference per photo, in order.
//!
//! ## Transforms
//!
//! - [`Monochrome`]: downloads the largest size of each photo, converts it to
//!   8-bit grayscale and re-uploads it as PNG.

use anyhow::{Context, Result};
use async_stream::stream;
use futures::stream::BoxStream;
use image::{DynamicImage, ImageOutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::BotError;
use crate::vk::{Photo, VkApi};

/// Lazy sequence of attachment references produced by a transform
pub type AttachmentStream<'a> = BoxStream<'a, Result<String>>;

/// Identifies a transform; stored in the conversation state while waiting for photos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    Monochrome,
}

/// A photo transform
pub trait Transform: Send + Sync {
    fn kind(&self) -> TransformKind;

    /// Process `photos` one after another, yielding an attachment for each.
    /// Nothing runs until the stream is polled.
    fn apply<'a>(
        &'a self,
        api: &'a dyn VkApi,
        peer_id: i64,
        photos: Vec<Photo>,
    ) -> AttachmentStream<'a>;
}

/// Grayscale conversion transform
#[derive(Debug, Clone, Default)]
pub struct Monochrome;

impl Transform for Monochrome {
    fn kind(&self) -> TransformKind {
        TransformKind::Monochrome
    }

    fn apply<'a>(
        &'a self,
        api: &'a dyn VkApi,
        peer_id: i64,
        photos: Vec<Photo>,
    ) -> AttachmentStream<'a> {
        Box::pin(stream! {
            for photo in photos {
                yield monochromize_photo(api, peer_id, &photo).await;
            }
        })
    }
}

async fn monochromize_photo(api: &dyn VkApi, peer_id: i64, photo: &Photo) -> Result<String> {
    let size = photo
        .largest_size()
        .ok_or(BotError::NoPhotoSizes(photo.id))?;
    debug!(
        peer_id,
        photo_id = photo.id,
        size = %size.kind,
        width = size.width,
        height = size.height,
        "Selected photo size"
    );

    let original = download_photo(&size.url).await?;
    let png = to_grayscale_png(&original)?;
    let attachment = api.upload_message_photo(peer_id, png).await?;

    info!(peer_id, photo_id = photo.id, attachment = %attachment, "Photo converted to grayscale");
    Ok(attachment)
}

/// Fetch the photo body with a fresh HTTP client
pub async fn download_photo(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("failed to download {url}"))?
        .error_for_status()?;
    let bytes = response.bytes().await?;
    debug!(url, bytes = bytes.len(), "Photo downloaded");
    Ok(bytes.to_vec())
}

/// Decode any supported image and re-encode it as single-channel 8-bit PNG
pub fn to_grayscale_png(data: &[u8]) -> Result<Vec<u8>> {
    let image = image::load_from_memory(data).context("failed to decode photo")?;
    let gray = DynamicImage::ImageLuma8(image.into_luma8());

    let mut output = Cursor::new(Vec::new());
    gray.write_to(&mut output, ImageOutputFormat::Png)
        .context("failed to encode PNG")?;
    Ok(output.into_inner())
}

/// Transforms available to the dialogue, by kind
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<TransformKind, Arc<dyn Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in transform
    pub fn with_defaults() -> Self {
        Self::new().with(Arc::new(Monochrome))
    }

    /// Register a transform under its own kind, replacing any previous one
    pub fn with(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.insert(transform.kind(), transform);
        self
    }

    pub fn get(&self, kind: TransformKind) -> Result<Arc<dyn Transform>, BotError> {
        self.transforms
            .get(&kind)
            .cloned()
            .ok_or(BotError::UnregisteredTransform(kind))
    }
}
