//! Outbound message model and wire-header shaping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::Credentials;

/// Priority levels for relay messages, wire values 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    /// Minimum priority (1): silent, hidden under other notifications
    Min = 1,
    /// Low priority (2): silent, visible in the notification drawer only
    Low = 2,
    /// Default priority (3): standard notification behavior
    #[default]
    Default = 3,
    /// High priority (4): pop-over notification with a long vibration burst
    High = 4,
    /// Urgent priority (5): pop-over notification, may bypass do-not-disturb
    Urgent = 5,
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, String> {
        match value {
            1 => Ok(Priority::Min),
            2 => Ok(Priority::Low),
            3 => Ok(Priority::Default),
            4 => Ok(Priority::High),
            5 => Ok(Priority::Urgent),
            other => Err(format!("priority out of range: {other}")),
        }
    }
}

/// Kind of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Open a website or app
    View,
    /// Send an HTTP request
    Http,
    /// Send an Android broadcast intent
    Broadcast,
}

impl ActionKind {
    fn as_str(&self) -> &'static str {
        match self {
            ActionKind::View => "view",
            ActionKind::Http => "http",
            ActionKind::Broadcast => "broadcast",
        }
    }
}

/// An action button attached to a message.
#[derive(Debug, Clone)]
pub struct Action {
    pub kind: ActionKind,
    /// Label displayed to the user
    pub label: String,
    pub url: String,
}

impl Action {
    /// Create a new action button
    pub fn new(kind: ActionKind, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            url: url.into(),
        }
    }

    /// Shorthand for a view action
    pub fn view(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ActionKind::View, label, url)
    }

    /// Shorthand for an http action
    pub fn http(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ActionKind::Http, label, url)
    }

    /// Shorthand for a broadcast action
    pub fn broadcast(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(ActionKind::Broadcast, label, url)
    }
}

/// A message attachment: a remote URL or a local file payload.
#[derive(Debug, Clone)]
pub enum Attachment {
    /// Remote URL, sent in the `Attach` header
    Url(Url),
    /// Local file payload, sent as the request body with a `Filename` header
    File { filename: String, bytes: Vec<u8> },
}

impl Attachment {
    /// Attach a local file payload
    pub fn file(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Attachment::File {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Upload mode decided by the attachment shape.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Simple mode: the message content is the request body
    Content(String),
    /// File mode: a local file's bytes are the request body
    File { filename: String, bytes: Vec<u8> },
}

/// A message to publish, plus per-call topic/host/credential overrides.
///
/// Only the content is required; every other field contributes a wire header
/// when present.
///
/// # Example
///
/// ```rust
/// use ntfy_client::{Action, Message, Priority};
///
/// let message = Message::new("Disk almost full")
///     .with_title("storage alert")
///     .with_priority(Priority::High)
///     .with_tag("warning")
///     .with_action(Action::view("Open dashboard", "https://example.com/disks"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Per-call topic override
    pub topic: Option<String>,
    /// Per-call host override
    pub host: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub priority: Option<Priority>,
    /// Click-through link
    pub link: Option<Url>,
    /// Notification icon link
    pub icon: Option<Url>,
    pub attachment: Option<Attachment>,
    pub actions: Vec<Action>,
    /// Delayed delivery timestamp
    pub delay: Option<DateTime<Utc>>,
    /// Emoji tags
    pub tags: Vec<String>,
    /// E-mail forwarding target
    pub email: Option<String>,
    /// Phone-call forwarding target
    pub phone: Option<String>,
    /// Per-call credential override
    pub credentials: Option<Credentials>,
    /// Per-call bearer-token override
    pub token: Option<String>,
}

impl Message {
    /// Create a message with the given content
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Override the target topic
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Override the service host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the message title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the message priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the click-through link
    pub fn with_link(mut self, link: Url) -> Self {
        self.link = Some(link);
        self
    }

    /// Set the notification icon
    pub fn with_icon(mut self, icon: Url) -> Self {
        self.icon = Some(icon);
        self
    }

    /// Set the attachment
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Add an action button
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Schedule delivery for a later point in time
    pub fn with_delay(mut self, delay: DateTime<Utc>) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add an emoji tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set the e-mail forwarding target
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the phone-call forwarding target
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Override the credentials for this call
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the bearer token for this call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Wire headers for this message, one pair per present field.
    ///
    /// `Priority` is always emitted. A URL attachment contributes `Attach`;
    /// a file attachment contributes `Filename` instead. Actions follow the
    /// service's mini-grammar: `<kind>, <label>, <url>` joined with `;`,
    /// the whole value prefixed with the literal `Actions: ` label.
    pub fn header_pairs(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();

        if let Some(title) = &self.title {
            headers.push(("Title", title.clone()));
        }

        headers.push((
            "Priority",
            u8::from(self.priority.unwrap_or_default()).to_string(),
        ));

        if let Some(link) = &self.link {
            headers.push(("Click", link.to_string()));
        }

        if let Some(icon) = &self.icon {
            headers.push(("Icon", icon.to_string()));
        }

        match &self.attachment {
            Some(Attachment::Url(url)) => headers.push(("Attach", url.to_string())),
            Some(Attachment::File { filename, .. }) => headers.push(("Filename", filename.clone())),
            None => {}
        }

        if let Some(delay) = &self.delay {
            headers.push(("Delay", delay.timestamp().to_string()));
        }

        if !self.tags.is_empty() {
            headers.push(("Tags", self.tags.join(",")));
        }

        if !self.actions.is_empty() {
            let joined = self
                .actions
                .iter()
                .map(|action| format!("{}, {}, {}", action.kind.as_str(), action.label, action.url))
                .collect::<Vec<_>>()
                .join(";");
            headers.push(("Actions", format!("Actions: {joined}")));
        }

        if let Some(email) = &self.email {
            headers.push(("Email", email.clone()));
        }

        if let Some(phone) = &self.phone {
            headers.push(("Call", phone.clone()));
        }

        headers
    }

    /// The request body and upload mode for this message.
    pub fn body(&self) -> RequestBody {
        match &self.attachment {
            Some(Attachment::File { filename, bytes }) => RequestBody::File {
                filename: filename.clone(),
                bytes: bytes.clone(),
            },
            _ => RequestBody::Content(self.content.clone()),
        }
    }
}
