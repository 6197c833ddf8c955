//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_stream::stream;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use vk_photo_bot::bot::BotContext;
use vk_photo_bot::dialogue::InMemStateStore;
use vk_photo_bot::image_pipeline::{AttachmentStream, Transform, TransformKind, TransformRegistry};
use vk_photo_bot::vk::types::Attachment;
use vk_photo_bot::vk::{Message, OutgoingMessage, Photo, PhotoSize, User, VkApi};

pub const PEER_ID: i64 = 100;

/// Records every outbound call instead of talking to VK
#[derive(Default)]
pub struct RecordingApi {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub user_lookups: Mutex<Vec<(i64, Vec<String>)>>,
    pub uploads: Mutex<Vec<(i64, Vec<u8>)>>,
    pub users: Mutex<HashMap<i64, User>>,
    pub fail_sends: Mutex<bool>,
}

impl RecordingApi {
    pub fn with_user(user: User) -> Self {
        let api = Self::default();
        api.users.lock().unwrap().insert(user.id, user);
        api
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl VkApi for RecordingApi {
    async fn send_message(&self, message: OutgoingMessage) -> Result<i64> {
        if *self.fail_sends.lock().unwrap() {
            return Err(anyhow!("send rejected"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(sent.len() as i64)
    }

    async fn get_user(&self, user_id: i64, fields: &[&str]) -> Result<User> {
        self.user_lookups
            .lock()
            .unwrap()
            .push((user_id, fields.iter().map(|f| f.to_string()).collect()));
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown user {user_id}"))
    }

    async fn upload_message_photo(&self, peer_id: i64, png: Vec<u8>) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((peer_id, png));
        Ok(format!("photo-1_{}", uploads.len()))
    }
}

/// Transform yielding `converted{photo id}` per photo, failing on ids listed in `fail_on`
#[derive(Default)]
pub struct FakeTransform {
    pub fail_on: Vec<i64>,
    pub calls: Mutex<usize>,
}

impl Transform for FakeTransform {
    fn kind(&self) -> TransformKind {
        TransformKind::Monochrome
    }

    fn apply<'a>(
        &'a self,
        _api: &'a dyn VkApi,
        _peer_id: i64,
        photos: Vec<Photo>,
    ) -> AttachmentStream<'a> {
        *self.calls.lock().unwrap() += 1;
        Box::pin(stream! {
            for photo in photos {
                if self.fail_on.contains(&photo.id) {
                    yield Err(anyhow!("download of photo {} failed", photo.id));
                } else {
                    yield Ok(format!("converted{}", photo.id));
                }
            }
        })
    }
}

pub fn user(id: i64, first_name: &str) -> User {
    User {
        id,
        first_name: first_name.to_string(),
        ..Default::default()
    }
}

pub fn context(api: Arc<RecordingApi>, transform: Arc<FakeTransform>) -> BotContext {
    BotContext::new(
        api,
        Arc::new(InMemStateStore::new()),
        Arc::new(TransformRegistry::new().with(transform)),
    )
}

pub fn text_message(text: &str) -> Message {
    Message {
        id: 1,
        date: 0,
        peer_id: PEER_ID,
        from_id: PEER_ID,
        text: text.to_string(),
        ..Default::default()
    }
}

pub fn payload_message(payload: &str) -> Message {
    Message {
        payload: Some(payload.to_string()),
        ..text_message("")
    }
}

pub fn photo(id: i64) -> Photo {
    Photo {
        id,
        owner_id: PEER_ID,
        access_key: None,
        sizes: vec![PhotoSize {
            kind: "x".to_string(),
            url: format!("https://example.com/{id}.jpg"),
            width: 604,
            height: 403,
        }],
    }
}

pub fn photo_message(ids: &[i64]) -> Message {
    Message {
        attachments: ids
            .iter()
            .map(|id| Attachment::Photo { photo: photo(*id) })
            .collect(),
        ..text_message("")
    }
}
