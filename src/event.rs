//! Wire model for service messages and client-side notifications

use serde::{Deserialize, Serialize};

use crate::message::Priority;

/// Attachment metadata inside a service message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub name: String,
    /// MIME type
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Expiry as an epoch timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    pub url: String,
}

/// A message as echoed or pushed by the service.
///
/// The service assigns the id; the client never retains these values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceMessage {
    /// Service-assigned message id
    pub id: String,
    /// Epoch timestamp the message was accepted
    pub time: i64,
    /// Epoch timestamp the message expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    /// Event kind (e.g. "message")
    pub event: String,
    pub topic: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Notification fanned out on the client's generic event channel.
///
/// Per-topic receivers (returned by `subscribe` or `topic_events`) carry the
/// bare [`ServiceMessage`] instead; callers pick the granularity they want.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// A subscription's stream reported open
    SubscriptionOpened { topic: String },
    /// A message arrived on a subscribed topic
    Message { topic: String, message: ServiceMessage },
    /// A subscription's stream failed; its entry has been removed
    StreamError { topic: String, reason: String },
}
