//! # ntfy-client
//!
//! An async client library for the [ntfy](https://ntfy.sh) push-notification
//! relay: publish messages to named topics over HTTP and hold long-lived
//! subscriptions fed by the service's event stream.
//!
//! ## Features
//!
//! - **Publish**: titles, priorities, tags, click/icon links, URL or file
//!   attachments, action buttons, delayed delivery, e-mail/phone forwarding
//! - **Subscribe**: one live stream per topic, with per-topic and
//!   client-wide event channels
//! - **Pluggable Transports**: implement `HttpTransport` or `StreamConnector`
//!   to swap the HTTP stack or drive subscriptions programmatically
//! - **Explicit Failure**: a stream error removes its subscription and is
//!   surfaced to the caller; the client never retries or reconnects on its own
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ntfy_client::{Message, Priority, RelayClient, SubscribeOptions};
//!
//! #[tokio::main]
//! async fn main() -> ntfy_client::Result<()> {
//!     let client = RelayClient::builder()
//!         .host("https://ntfy.sh")
//!         .topic("alerts")
//!         .build()?;
//!
//!     let receipt = client
//!         .send(
//!             &Message::new("Backup finished")
//!                 .with_title("nightly backup")
//!                 .with_priority(Priority::High),
//!         )
//!         .await?;
//!     println!("accepted as {}", receipt.id);
//!
//!     let mut inbox = client.subscribe(SubscribeOptions::default())?;
//!     while let Ok(message) = inbox.recv().await {
//!         println!("[{}] {}", message.topic, message.message);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## With Authentication
//!
//! ```rust,no_run
//! use ntfy_client::{Credentials, RelayClient, SubscribeOptions};
//!
//! # fn main() -> ntfy_client::Result<()> {
//! let client = RelayClient::builder()
//!     .host("https://relay.internal.example.com")
//!     .credentials(Credentials::new("backups", "hunter2"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! Subscriptions embed credentials in the stream URL's `auth` query
//! parameter, since the stream transport cannot carry headers; publishes use
//! basic auth or an `Authorization` header. Per-call credentials on a
//! [`Message`] or [`SubscribeOptions`] override the client defaults.

pub mod auth;
mod client;
pub mod connector;
mod endpoint;
mod error;
mod event;
mod message;
mod registry;
pub mod transport;

// Re-exports
pub use auth::{Auth, Credentials};
pub use client::{RelayClient, RelayClientBuilder, SubscribeOptions};
pub use connector::{ChannelConnector, OpenedStream, SseConnector, StreamConnector, StreamEvent, StreamHandler};
pub use endpoint::{validate_host, DEFAULT_HOST};
pub use error::{Error, Result};
pub use event::{AttachmentInfo, ClientEvent, ServiceMessage};
pub use message::{Action, ActionKind, Attachment, Message, Priority, RequestBody};
pub use transport::{HttpTransport, ReqwestTransport, RequestOptions, TransportResponse};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
