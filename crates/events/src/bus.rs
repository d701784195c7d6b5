//! Broadcast bus carrying simulation events to any number of observers.

use tokio::sync::broadcast;

use crate::types::EventEnvelope;

/// Must exceed the number of events one full run publishes.
const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to current subscribers, returning how many received it.
    /// With nobody listening the event is dropped.
    pub fn publish(&self, envelope: EventEnvelope) -> usize {
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive events published from now on. A receiver that falls more
    /// than the capacity behind gets `RecvError::Lagged` and resumes from
    /// the oldest retained event.
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
