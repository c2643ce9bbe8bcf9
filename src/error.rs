//! Error types for the relay client

use thiserror::Error;

/// Result type alias using the library's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the relay client
#[derive(Error, Debug)]
pub enum Error {
    /// The host string is malformed
    #[error("invalid host '{0}': use http[s]://<ip or domain>[:port]")]
    InvalidHost(String),

    /// No topic could be resolved, or the topic is not subscribed
    #[error("invalid topic: {0}")]
    InvalidTopic(String),

    /// The service requires credentials (HTTP 403); carries the service's error body
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    /// The service rejected the supplied credentials (HTTP 401); carries the body
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The topic already has a live subscription
    #[error("already subscribed to topic '{0}'")]
    DuplicateSubscription(String),

    /// The service answered with an unmapped status
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// Network-level or decoding failures
    #[error("transport error: {0}")]
    Transport(#[from] anyhow::Error),
}
