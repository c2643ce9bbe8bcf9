//! Event-stream transport for the subscribe path
//!
//! Implement `StreamConnector` to receive a topic's events from any stream
//! transport. The default implementation reads the service's SSE endpoint;
//! `ChannelConnector` drives subscriptions programmatically (tests,
//! embedding).

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Events delivered by a stream connector.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// The stream is open and the service will push messages
    Open,
    /// One event payload, the data of a default-typed frame
    Message(String),
}

/// Callback invoked for every stream event, in transport order.
pub type StreamHandler = Arc<dyn Fn(StreamEvent) + Send + Sync>;

/// Trait for stream transports.
///
/// `open` runs until the cancellation token fires (clean close, `Ok`) or the
/// stream fails (`Err`). A stream that ends without cancellation is a failure:
/// the client never reconnects on its own.
#[async_trait]
pub trait StreamConnector: Send + Sync + 'static {
    /// Open the stream at `url` and deliver its events through `handler`.
    async fn open(
        &self,
        url: &str,
        handler: StreamHandler,
        cancel: CancellationToken,
    ) -> anyhow::Result<()>;

    /// Return the connector name (for logging)
    fn name(&self) -> &'static str;
}

/// Default connector reading the service's SSE endpoint over `reqwest`
/// byte streams.
#[derive(Debug, Clone, Default)]
pub struct SseConnector {
    client: reqwest::Client,
}

impl SseConnector {
    /// Create a new connector with its own client
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StreamConnector for SseConnector {
    async fn open(
        &self,
        url: &str,
        handler: StreamHandler,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "stream endpoint returned status {}: {}",
                response.status().as_u16(),
                response.text().await.unwrap_or_default()
            );
        }

        handler(StreamEvent::Open);

        let mut stream = response.bytes_stream();
        let mut parser = FrameParser::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                chunk = stream.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for data in parser.push(&bytes) {
                            handler(StreamEvent::Message(data));
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => anyhow::bail!("stream closed by the service"),
                },
            }
        }
    }

    fn name(&self) -> &'static str {
        "Sse"
    }
}

/// Incremental SSE frame parser.
///
/// Accumulates raw bytes, splits frames on blank lines, joins multi-line
/// `data:` fields, and drops comments and named non-message events
/// (EventSource default-event semantics).
struct FrameParser {
    buffer: Vec<u8>,
}

impl FrameParser {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Feed raw bytes, returning the data of every completed message frame.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend(bytes.iter().copied().filter(|&b| b != b'\r'));

        let mut messages = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let frame = String::from_utf8_lossy(&frame[..end]);
            if let Some(data) = parse_frame(&frame) {
                messages.push(data);
            }
        }
        messages
    }
}

/// Parse one frame, returning its data if it is a default-typed event.
fn parse_frame(frame: &str) -> Option<String> {
    let mut event_type = "message";
    let mut data_lines = Vec::new();

    for line in frame.lines() {
        if line.starts_with(':') {
            // comment / keepalive
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event_type = value,
            "data" => data_lines.push(value),
            _ => {}
        }
    }

    if event_type != "message" || data_lines.is_empty() {
        return None;
    }
    Some(data_lines.join("\n"))
}

enum Injected {
    Event(StreamEvent),
    Fail(String),
}

/// Handle to one stream opened through a [`ChannelConnector`].
///
/// Events pushed here reach the subscription as if the service had sent them.
pub struct OpenedStream {
    url: String,
    tx: mpsc::UnboundedSender<Injected>,
}

impl OpenedStream {
    /// The URL the subscription opened
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Report the stream as open
    pub fn emit_open(&self) {
        let _ = self.tx.send(Injected::Event(StreamEvent::Open));
    }

    /// Push one event payload
    pub fn emit_message(&self, data: impl Into<String>) {
        let _ = self
            .tx
            .send(Injected::Event(StreamEvent::Message(data.into())));
    }

    /// Fail the stream, terminating its subscription
    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.tx.send(Injected::Fail(reason.into()));
    }
}

/// A channel-driven stream connector for programmatic use and tests.
///
/// Every `open` call surfaces as an [`OpenedStream`] on the receiver returned
/// by [`ChannelConnector::new`].
pub struct ChannelConnector {
    opened_tx: mpsc::UnboundedSender<OpenedStream>,
}

impl ChannelConnector {
    /// Create a new connector and the receiver of its opened streams
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OpenedStream>) {
        let (opened_tx, opened_rx) = mpsc::unbounded_channel();
        (Self { opened_tx }, opened_rx)
    }
}

#[async_trait]
impl StreamConnector for ChannelConnector {
    async fn open(
        &self,
        url: &str,
        handler: StreamHandler,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.opened_tx
            .send(OpenedStream {
                url: url.to_string(),
                tx,
            })
            .map_err(|_| anyhow::anyhow!("stream controller dropped"))?;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                item = rx.recv() => match item {
                    Some(Injected::Event(event)) => handler(event),
                    Some(Injected::Fail(reason)) => anyhow::bail!(reason),
                    None => return Ok(()),
                },
            }
        }
    }

    fn name(&self) -> &'static str {
        "Channel"
    }
}
