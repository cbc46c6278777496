//! Lifecycle notifications for selector and provider registration.
//!
//! Broadcast-based: every subscriber gets its own receiver, so a slow or
//! dropped subscriber never holds up registration or other subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::domain::models::QuickFixSelector;
use crate::domain::ports::QuickFixProvider;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing sequence number assigned by the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNumber(pub u64);

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three lifecycle streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ProviderRegistered,
    CommandSelectorRegistered,
    ProviderUnregistered,
}

/// A lifecycle notification.
#[derive(Clone)]
pub enum QuickFixEvent {
    /// A selector and the provider serving it are both registered
    ProviderRegistered {
        selector: QuickFixSelector,
        provider: Arc<dyn QuickFixProvider>,
    },
    /// A selector was registered or replaced
    CommandSelectorRegistered(QuickFixSelector),
    /// A provider or selector with this id went away
    ProviderUnregistered(String),
}

impl QuickFixEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ProviderRegistered { .. } => EventKind::ProviderRegistered,
            Self::CommandSelectorRegistered(_) => EventKind::CommandSelectorRegistered,
            Self::ProviderUnregistered(_) => EventKind::ProviderUnregistered,
        }
    }

    /// Id of the selector/provider the event is about.
    pub fn id(&self) -> &str {
        match self {
            Self::ProviderRegistered { selector, .. } | Self::CommandSelectorRegistered(selector) => {
                selector.id()
            }
            Self::ProviderUnregistered(id) => id,
        }
    }
}

impl fmt::Debug for QuickFixEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickFixEvent")
            .field("kind", &self.kind())
            .field("id", &self.id())
            .finish()
    }
}

/// Event envelope with ordering metadata.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub id: EventId,
    pub sequence: SequenceNumber,
    pub timestamp: DateTime<Utc>,
    pub event: QuickFixEvent,
}

/// Configuration for the event bus.
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for the broadcast channel.
    pub channel_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
        }
    }
}

/// Broadcasts lifecycle events to any number of subscribers.
pub struct QuickFixEventBus {
    sender: broadcast::Sender<EventEnvelope>,
    sequence: AtomicU64,
}

impl fmt::Debug for QuickFixEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickFixEventBus")
            .field("sequence", &self.current_sequence())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for QuickFixEventBus {
    fn default() -> Self {
        Self::new(EventBusConfig::default())
    }
}

impl QuickFixEventBus {
    pub fn new(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Publish an event. Never blocks and never fails.
    pub fn publish(&self, event: QuickFixEvent) -> SequenceNumber {
        let sequence = SequenceNumber(self.sequence.fetch_add(1, Ordering::SeqCst));
        tracing::trace!(kind = ?event.kind(), id = %event.id(), %sequence, "Publishing lifecycle event");

        let envelope = EventEnvelope {
            id: EventId::new(),
            sequence,
            timestamp: Utc::now(),
            event,
        };

        // No subscribers is fine
        let _ = self.sender.send(envelope);
        sequence
    }

    /// Subscribe to every lifecycle event.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            kind: None,
        }
    }

    /// Subscribe to a single stream.
    pub fn subscribe_to(&self, kind: EventKind) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            kind: Some(kind),
        }
    }

    pub fn current_sequence(&self) -> SequenceNumber {
        SequenceNumber(self.sequence.load(Ordering::SeqCst))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving end of a (possibly filtered) event stream.
pub struct Subscription {
    receiver: broadcast::Receiver<EventEnvelope>,
    kind: Option<EventKind>,
}

impl Subscription {
    /// Next matching event, or `None` once the bus is gone.
    ///
    /// A subscriber that falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if self.accepts(&envelope) => return Some(envelope),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lifecycle subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event if one is already queued.
    pub fn try_recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) if self.accepts(&envelope) => return Some(envelope),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lifecycle subscriber lagged; events dropped");
                }
                Err(_) => return None,
            }
        }
    }

    fn accepts(&self, envelope: &EventEnvelope) -> bool {
        self.kind.is_none_or(|k| envelope.event.kind() == k)
    }
}
