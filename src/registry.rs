//! Subscription registry: topic -> live stream ownership
//!
//! The registry exclusively owns each stream (its cancellation token and
//! per-topic sender); externally, subscriptions appear only as topic-name
//! snapshots, never as handles.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::event::ServiceMessage;

const TOPIC_CHANNEL_CAPACITY: usize = 64;

struct SubscriptionEntry {
    /// Distinguishes this subscription from a later one on the same topic
    id: Uuid,
    cancel: CancellationToken,
    sender: broadcast::Sender<ServiceMessage>,
}

/// Topic-scoped state captured by one subscription's stream task.
pub(crate) struct SubscriptionHandle {
    pub id: Uuid,
    pub cancel: CancellationToken,
    pub sender: broadcast::Sender<ServiceMessage>,
}

/// The set of live topic subscriptions; at most one per topic string.
#[derive(Clone, Default)]
pub(crate) struct SubscriptionRegistry {
    entries: Arc<DashMap<String, SubscriptionEntry>>,
}

impl SubscriptionRegistry {
    /// Register a topic, failing if it already has a live subscription.
    ///
    /// Registration is atomic on the map entry; the caller wires callbacks
    /// only after this returns, so no event can reach an unregistered topic.
    pub fn insert(&self, topic: &str) -> Result<SubscriptionHandle> {
        match self.entries.entry(topic.to_string()) {
            Entry::Occupied(_) => Err(Error::DuplicateSubscription(topic.to_string())),
            Entry::Vacant(vacant) => {
                let id = Uuid::new_v4();
                let cancel = CancellationToken::new();
                let (sender, _) = broadcast::channel(TOPIC_CHANNEL_CAPACITY);
                vacant.insert(SubscriptionEntry {
                    id,
                    cancel: cancel.clone(),
                    sender: sender.clone(),
                });
                Ok(SubscriptionHandle { id, cancel, sender })
            }
        }
    }

    /// Remove a topic, cancelling its stream.
    pub fn remove(&self, topic: &str) -> Result<()> {
        match self.entries.remove(topic) {
            Some((_, entry)) => {
                entry.cancel.cancel();
                Ok(())
            }
            None => Err(Error::InvalidTopic(format!("not subscribed to '{topic}'"))),
        }
    }

    /// Remove the topic's entry only if it still belongs to subscription `id`.
    ///
    /// Stream tasks self-remove through this path; a topic that was
    /// unsubscribed and resubscribed in the meantime keeps its new entry.
    pub fn remove_if(&self, topic: &str, id: Uuid) -> bool {
        self.entries.remove_if(topic, |_, entry| entry.id == id).is_some()
    }

    /// Remove every entry, cancelling each stream; returns the count removed.
    pub fn remove_all(&self) -> usize {
        let mut count = 0;
        self.entries.retain(|_, entry| {
            entry.cancel.cancel();
            count += 1;
            false
        });
        count
    }

    /// Attach a new receiver to a topic's live channel.
    pub fn subscribe_topic(&self, topic: &str) -> Option<broadcast::Receiver<ServiceMessage>> {
        self.entries.get(topic).map(|entry| entry.sender.subscribe())
    }

    /// Snapshot of the active topic names; order is unspecified.
    pub fn topics(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }
}
