//! HTTP client for the VK API methods used by the bot.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::BotConfig;
use crate::errors::BotError;

use super::types::{
    attachment_ref, ApiEnvelope, GroupsResponse, LongPollResponse, LongPollServer,
    OutgoingMessage, UploadServer, UploadedPhoto, User,
};

/// File name announced to the upload server
const UPLOAD_FILE_NAME: &str = "image.png";

/// Outbound operations handlers depend on
#[async_trait]
pub trait VkApi: Send + Sync {
    /// Deliver a reply; returns the id of the sent message
    async fn send_message(&self, message: OutgoingMessage) -> Result<i64>;

    /// Look up a user profile with the requested optional fields
    async fn get_user(&self, user_id: i64, fields: &[&str]) -> Result<User>;

    /// Upload PNG bytes as a message photo for `peer_id`; returns the attachment reference
    async fn upload_message_photo(&self, peer_id: i64, png: Vec<u8>) -> Result<String>;
}

/// reqwest-backed VK API client
#[derive(Debug, Clone)]
pub struct VkClient {
    http: reqwest::Client,
    token: String,
    api_url: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct SavedPhoto {
    id: i64,
    owner_id: i64,
    #[serde(default)]
    access_key: Option<String>,
}

impl VkClient {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: config.token.clone(),
            api_url: config.api_url.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Call an API method and unwrap its `response` field
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/method/{}", self.api_url, method);
        debug!(method, "Calling VK API");

        let mut form: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        form.push(("access_token", self.token.as_str()));
        form.push(("v", self.api_version.as_str()));

        let body = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .with_context(|| format!("request to {method} failed"))?
            .error_for_status()?
            .bytes()
            .await?;

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&body).map_err(BotError::from)?;

        if let Some(error) = envelope.error {
            return Err(BotError::Api {
                code: error.error_code,
                message: error.error_msg,
            }
            .into());
        }

        envelope
            .response
            .ok_or_else(|| BotError::Decode(format!("{method} returned no response")).into())
    }

    /// Id of the community the token belongs to
    pub async fn group_id(&self) -> Result<i64> {
        let groups: GroupsResponse = self.call("groups.getById", &[]).await?;
        let group = groups
            .into_groups()
            .into_iter()
            .next()
            .ok_or_else(|| BotError::Decode("groups.getById returned no groups".to_string()))?;
        info!(group_id = group.id, "Resolved community id");
        Ok(group.id)
    }

    pub async fn long_poll_server(&self, group_id: i64) -> Result<LongPollServer> {
        self.call("groups.getLongPollServer", &[("group_id", group_id.to_string())])
            .await
    }

    /// Wait for events on the long poll server
    pub async fn poll(&self, server: &LongPollServer, wait_secs: u64) -> Result<LongPollResponse> {
        let wait = wait_secs.to_string();
        let response = self
            .http
            .get(&server.server)
            .query(&[
                ("act", "a_check"),
                ("key", server.key.as_str()),
                ("ts", server.ts.as_str()),
                ("wait", wait.as_str()),
            ])
            .send()
            .await
            .context("long poll request failed")?
            .error_for_status()?
            .json::<LongPollResponse>()
            .await
            .context("failed to decode long poll response")?;
        Ok(response)
    }
}

#[async_trait]
impl VkApi for VkClient {
    async fn send_message(&self, message: OutgoingMessage) -> Result<i64> {
        let mut params = vec![
            ("peer_id", message.peer_id.to_string()),
            ("random_id", rand::random::<i32>().to_string()),
        ];
        if let Some(text) = message.message {
            params.push(("message", text));
        }
        if let Some(attachment) = message.attachment {
            params.push(("attachment", attachment));
        }
        if let Some(keyboard) = message.keyboard {
            params.push(("keyboard", serde_json::to_string(&keyboard)?));
        }

        let message_id: i64 = self.call("messages.send", &params).await?;
        debug!(peer_id = message.peer_id, message_id, "Message sent");
        Ok(message_id)
    }

    async fn get_user(&self, user_id: i64, fields: &[&str]) -> Result<User> {
        let mut params = vec![("user_ids", user_id.to_string())];
        if !fields.is_empty() {
            params.push(("fields", fields.join(",")));
        }

        let users: Vec<User> = self.call("users.get", &params).await?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| BotError::Decode(format!("users.get returned no user {user_id}")).into())
    }

    async fn upload_message_photo(&self, peer_id: i64, png: Vec<u8>) -> Result<String> {
        let server: UploadServer = self
            .call(
                "photos.getMessagesUploadServer",
                &[("peer_id", peer_id.to_string())],
            )
            .await?;

        let size = png.len();
        let part = Part::bytes(png)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("image/png")?;
        let uploaded: UploadedPhoto = self
            .http
            .post(&server.upload_url)
            .multipart(Form::new().part("photo", part))
            .send()
            .await
            .context("photo upload failed")?
            .error_for_status()?
            .json()
            .await
            .context("failed to decode upload response")?;
        debug!(peer_id, bytes = size, "Photo uploaded");

        let saved: Vec<SavedPhoto> = self
            .call(
                "photos.saveMessagesPhoto",
                &[
                    ("server", uploaded.server.to_string()),
                    ("photo", uploaded.photo),
                    ("hash", uploaded.hash),
                ],
            )
            .await?;
        let photo = saved.into_iter().next().ok_or_else(|| {
            BotError::Decode("photos.saveMessagesPhoto returned no photo".to_string())
        })?;

        Ok(attachment_ref(
            photo.owner_id,
            photo.id,
            photo.access_key.as_deref(),
        ))
    }
}
