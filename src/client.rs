//! Relay client: publish and subscription lifecycle

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::auth::{Auth, Credentials};
use crate::connector::{SseConnector, StreamConnector, StreamEvent, StreamHandler};
use crate::endpoint::{self, DEFAULT_HOST};
use crate::error::{Error, Result};
use crate::event::{ClientEvent, ServiceMessage};
use crate::message::{Message, RequestBody};
use crate::registry::{SubscriptionHandle, SubscriptionRegistry};
use crate::transport::{HttpTransport, ReqwestTransport, RequestOptions};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Options for one subscription.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Per-call topic override
    pub topic: Option<String>,
    /// Per-call host override
    pub host: Option<String>,
    /// Per-call credential override
    pub credentials: Option<Credentials>,
    /// Per-call bearer-token override
    pub token: Option<String>,
}

impl SubscribeOptions {
    /// Subscribe to the given topic
    pub fn topic(topic: impl Into<String>) -> Self {
        Self {
            topic: Some(topic.into()),
            ..Self::default()
        }
    }

    /// Override the service host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Override the credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Override the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// A client for the push-notification relay.
///
/// Publishes messages over HTTP and maintains long-lived topic subscriptions
/// fed by a server-initiated event stream. Cloning is cheap; clones share the
/// same subscriptions and event channel.
#[derive(Clone)]
pub struct RelayClient {
    host: String,
    topic: Option<String>,
    credentials: Option<Credentials>,
    token: Option<String>,
    transport: Arc<dyn HttpTransport>,
    connector: Arc<dyn StreamConnector>,
    registry: SubscriptionRegistry,
    events: broadcast::Sender<ClientEvent>,
}

impl RelayClient {
    /// Create a client against the default public host, with no default
    /// topic, no credentials, and no subscriptions.
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            topic: None,
            credentials: None,
            token: None,
            transport: Arc::new(ReqwestTransport::new()),
            connector: Arc::new(SseConnector::new()),
            registry: SubscriptionRegistry::default(),
            events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        }
    }

    /// Create a client builder
    pub fn builder() -> RelayClientBuilder {
        RelayClientBuilder::default()
    }

    /// Publish a message, one attempt, no retry.
    ///
    /// Validation failures (host, topic) are raised before any network call.
    /// A URL attachment rides in the `Attach` header of a create-style
    /// request; a file attachment switches to a replace-style request whose
    /// body is the file's bytes.
    pub async fn send(&self, message: &Message) -> Result<ServiceMessage> {
        if let Some(host) = &message.host {
            endpoint::validate_host(host)?;
        }
        let topic = self.resolve_topic(message.topic.as_deref())?;
        let host = message.host.as_deref().unwrap_or(&self.host);
        let url = endpoint::publish_url(host, &topic)?;

        let mut options = RequestOptions::default();
        match Auth::resolve(
            message.credentials.as_ref(),
            message.token.as_deref(),
            self.credentials.as_ref(),
            self.token.as_deref(),
        ) {
            Some(Auth::Basic(credentials)) => options.basic_auth = Some(credentials),
            Some(Auth::Bearer(token)) => {
                options.headers.push(("Authorization", format!("Bearer {token}")))
            }
            None => {}
        }
        options.headers.extend(message.header_pairs());

        tracing::debug!(topic = %topic, url = %url, transport = self.transport.name(), "publishing message");

        let response = match message.body() {
            RequestBody::Content(content) => {
                self.transport.post(url.as_str(), content, options).await?
            }
            RequestBody::File { bytes, .. } => {
                self.transport.put(url.as_str(), bytes, options).await?
            }
        };

        if response.is_success() {
            serde_json::from_str(&response.body)
                .map_err(|e| Error::Transport(anyhow::anyhow!("malformed service response: {e}")))
        } else {
            Err(match response.status {
                403 => Error::AuthorizationDenied(response.body),
                401 => Error::InvalidCredentials(response.body),
                status => Error::UnexpectedStatus {
                    status,
                    body: response.body,
                },
            })
        }
    }

    /// Subscribe to a topic, returning its per-topic message receiver.
    ///
    /// Does not block: the topic is registered and its stream task spawned,
    /// with activation and data delivery arriving later on the event channels.
    /// Fails with [`Error::DuplicateSubscription`] if the topic is already
    /// active; the failed attempt leaves the registry untouched. A stream
    /// failure is terminal: the entry is removed and a
    /// [`ClientEvent::StreamError`] is emitted, never a reconnect.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, options: SubscribeOptions) -> Result<broadcast::Receiver<ServiceMessage>> {
        if let Some(host) = &options.host {
            endpoint::validate_host(host)?;
        }
        let topic = self.resolve_topic(options.topic.as_deref())?;
        let host = options.host.as_deref().unwrap_or(&self.host);

        let auth = Auth::resolve(
            options.credentials.as_ref(),
            options.token.as_deref(),
            self.credentials.as_ref(),
            self.token.as_deref(),
        );
        let url = endpoint::stream_url(host, &topic, auth.as_ref())?;

        // Registered before the stream task exists: an early event always
        // finds its entry.
        let handle = self.registry.insert(&topic)?;
        let receiver = handle.sender.subscribe();

        tracing::info!(topic = %topic, connector = self.connector.name(), "subscribed");

        let registry = self.registry.clone();
        let connector = self.connector.clone();
        let events = self.events.clone();
        let SubscriptionHandle { id, cancel, sender } = handle;
        let task_topic = topic;

        tokio::spawn(async move {
            // The handler captures only this subscription's state; once its
            // token is cancelled, in-flight callbacks become no-ops.
            let handler_events = events.clone();
            let handler_sender = sender;
            let handler_topic = task_topic.clone();
            let handler_cancel = cancel.clone();
            let handler: StreamHandler = Arc::new(move |event| {
                if handler_cancel.is_cancelled() {
                    return;
                }
                match event {
                    StreamEvent::Open => {
                        let _ = handler_events.send(ClientEvent::SubscriptionOpened {
                            topic: handler_topic.clone(),
                        });
                    }
                    StreamEvent::Message(raw) => match serde_json::from_str::<ServiceMessage>(&raw) {
                        Ok(message) => {
                            let _ = handler_events.send(ClientEvent::Message {
                                topic: handler_topic.clone(),
                                message: message.clone(),
                            });
                            let _ = handler_sender.send(message);
                        }
                        Err(e) => {
                            tracing::warn!(topic = %handler_topic, error = %e, "skipping malformed stream payload")
                        }
                    },
                }
            });

            match connector.open(url.as_str(), handler, cancel.clone()).await {
                Ok(()) => {
                    if !cancel.is_cancelled() && registry.remove_if(&task_topic, id) {
                        tracing::debug!(topic = %task_topic, "stream ended");
                    }
                }
                Err(e) => {
                    if registry.remove_if(&task_topic, id) {
                        tracing::warn!(topic = %task_topic, error = %e, "stream failed, subscription removed");
                        let _ = events.send(ClientEvent::StreamError {
                            topic: task_topic,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        });

        Ok(receiver)
    }

    /// Unsubscribe from a topic, closing its stream.
    pub fn unsubscribe(&self, topic: &str) -> Result<()> {
        self.registry.remove(topic)?;
        tracing::info!(topic, "unsubscribed");
        Ok(())
    }

    /// Unsubscribe from every topic; returns the count removed.
    pub fn unsubscribe_all(&self) -> usize {
        let count = self.registry.remove_all();
        if count > 0 {
            tracing::info!(count, "unsubscribed from all topics");
        }
        count
    }

    /// Snapshot of the subscribed topic names; order is unspecified.
    pub fn subscriptions(&self) -> Vec<String> {
        self.registry.topics()
    }

    /// Receiver for the generic event channel: subscription lifecycle,
    /// messages across all topics, and stream errors.
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Attach a new receiver to a live subscription's per-topic channel.
    pub fn topic_events(&self, topic: &str) -> Result<broadcast::Receiver<ServiceMessage>> {
        self.registry
            .subscribe_topic(topic)
            .ok_or_else(|| Error::InvalidTopic(format!("not subscribed to '{topic}'")))
    }

    /// Resolve the effective topic: call override, else instance default.
    /// Empty strings count as absent.
    fn resolve_topic(&self, call_topic: Option<&str>) -> Result<String> {
        call_topic
            .filter(|t| !t.is_empty())
            .or_else(|| self.topic.as_deref().filter(|t| !t.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                Error::InvalidTopic("no topic given and no default topic configured".to_string())
            })
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`RelayClient`]
pub struct RelayClientBuilder {
    host: String,
    topic: Option<String>,
    credentials: Option<Credentials>,
    token: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
    connector: Option<Arc<dyn StreamConnector>>,
    subscriptions: Vec<SubscribeOptions>,
}

impl Default for RelayClientBuilder {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            topic: None,
            credentials: None,
            token: None,
            transport: None,
            connector: None,
            subscriptions: Vec::new(),
        }
    }
}

impl RelayClientBuilder {
    /// Set the service host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the default topic
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the default credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the default bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the HTTP transport
    pub fn transport<T: HttpTransport>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set the stream connector
    pub fn connector<C: StreamConnector>(mut self, connector: C) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Add an initial subscription, replayed through `subscribe` at build time
    pub fn subscription(mut self, options: SubscribeOptions) -> Self {
        self.subscriptions.push(options);
        self
    }

    /// Build the client, replaying any initial subscriptions.
    ///
    /// A replay failure (duplicate topic, invalid topic or host) fails
    /// construction. Must be called from within a Tokio runtime when initial
    /// subscriptions are set.
    pub fn build(self) -> Result<RelayClient> {
        endpoint::validate_host(&self.host)?;

        let client = RelayClient {
            host: self.host,
            topic: self.topic,
            credentials: self.credentials,
            token: self.token,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(SseConnector::new())),
            registry: SubscriptionRegistry::default(),
            events: broadcast::channel(EVENT_CHANNEL_CAPACITY).0,
        };

        for options in self.subscriptions {
            client.subscribe(options)?;
        }

        Ok(client)
    }
}
