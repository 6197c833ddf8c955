//! Typed views of the VK API objects the bot reads and writes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// Peer ids at or above this offset address group chats rather than users
pub const GROUP_CHAT_PEER_OFFSET: i64 = 2_000_000_000;

/// Inbound message as delivered in a `message_new` update
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: i64,
    /// Unix time in seconds
    pub date: i64,
    pub peer_id: i64,
    pub from_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Button payload, a JSON document encoded as a string
    #[serde(default)]
    pub payload: Option<String>,
}

impl Message {
    /// Parsed button payload; malformed payloads are treated as absent
    pub fn payload(&self) -> Option<Value> {
        let raw = self.payload.as_deref()?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(peer_id = self.peer_id, error = %e, "Ignoring malformed payload");
                None
            }
        }
    }

    /// Photo attachments in the order they were sent
    pub fn photos(&self) -> Vec<Photo> {
        self.attachments
            .iter()
            .filter_map(|a| match a {
                Attachment::Photo { photo } => Some(photo.clone()),
                Attachment::Other => None,
            })
            .collect()
    }

    /// Whether the message came from a one-to-one conversation with a user
    pub fn is_private(&self) -> bool {
        self.peer_id > 0 && self.peer_id < GROUP_CHAT_PEER_OFFSET
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    Photo { photo: Photo },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Photo {
    pub id: i64,
    pub owner_id: i64,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub sizes: Vec<PhotoSize>,
}

impl Photo {
    /// The size variant with the most pixels; earlier entries win ties
    pub fn largest_size(&self) -> Option<&PhotoSize> {
        self.sizes
            .iter()
            .rev()
            .max_by_key(|size| u64::from(size.width) * u64::from(size.height))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PhotoSize {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Format a `photo{owner}_{id}[_{access_key}]` reference
pub fn attachment_ref(owner_id: i64, id: i64, access_key: Option<&str>) -> String {
    match access_key.filter(|k| !k.is_empty()) {
        Some(key) => format!("photo{owner_id}_{id}_{key}"),
        None => format!("photo{owner_id}_{id}"),
    }
}

/// Profile returned by `users.get`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    /// `{owner}_{id}` of the current avatar, absent when none is set
    #[serde(default)]
    pub photo_id: Option<String>,
    /// Offset from UTC in hours
    #[serde(default)]
    pub timezone: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Primary,
    Secondary,
    Negative,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    /// JSON document encoded as a string, echoed back in the message payload
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub action: ButtonAction,
    pub color: ButtonColor,
}

impl Button {
    pub fn text(label: impl Into<String>, payload: &Value, color: ButtonColor) -> Self {
        Self {
            action: ButtonAction {
                kind: "text".to_string(),
                label: label.into(),
                payload: payload.to_string(),
            },
            color,
        }
    }

    pub fn payload(&self) -> Option<Value> {
        serde_json::from_str(&self.action.payload).ok()
    }
}

/// Bot keyboard shown under the message input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyboard {
    pub one_time: bool,
    pub inline: bool,
    pub buttons: Vec<Vec<Button>>,
}

/// Reply to be delivered through `messages.send`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub peer_id: i64,
    pub message: Option<String>,
    pub attachment: Option<String>,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingMessage {
    pub fn new(peer_id: i64) -> Self {
        Self {
            peer_id,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    pub fn attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    pub fn keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// `error` object of a failed API call
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error_code: i64,
    #[serde(default)]
    pub error_msg: String,
}

/// Envelope wrapping every API method response
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: Option<T>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub id: i64,
}

/// `groups.getById` changed shape in 5.194; accept both
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GroupsResponse {
    Wrapped { groups: Vec<Group> },
    Plain(Vec<Group>),
}

impl GroupsResponse {
    pub fn into_groups(self) -> Vec<Group> {
        match self {
            GroupsResponse::Wrapped { groups } => groups,
            GroupsResponse::Plain(groups) => groups,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LongPollServer {
    pub key: String,
    pub server: String,
    #[serde(deserialize_with = "string_or_number")]
    pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct LongPollResponse {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub ts: Option<String>,
    #[serde(default)]
    pub updates: Vec<Update>,
    #[serde(default)]
    pub failed: Option<u8>,
}

/// A single long poll event; only `message_new` is interpreted
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Update {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub object: Value,
}

#[derive(Debug, Deserialize)]
struct MessageNew {
    message: Message,
}

impl Update {
    pub fn into_message(self) -> Result<Option<Message>, serde_json::Error> {
        if self.kind != "message_new" {
            return Ok(None);
        }
        let event: MessageNew = serde_json::from_value(self.object)?;
        Ok(Some(event.message))
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadServer {
    pub upload_url: String,
}

/// Body returned by the upload server after a multipart POST
#[derive(Debug, Deserialize)]
pub struct UploadedPhoto {
    pub server: i64,
    pub photo: String,
    pub hash: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}
