//! The seam between the bridge and the host's publish/subscribe mechanism.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use super::events::HostEvent;

/// A host event source the bridge can subscribe to.
pub trait EventBus: Send + Sync {
    /// Open a new subscription. The stream ends when the bus is dropped.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent>;
}

/// In-process bus: every published event is delivered to every live subscriber.
#[derive(Debug, Default)]
pub struct ChannelBus {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<HostEvent>>>,
}

impl ChannelBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to all subscribers, pruning closed ones.
    /// Returns how many subscribers received it.
    pub fn publish(&self, event: HostEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        subscribers.len()
    }

    /// Drop every subscription, ending their streams.
    pub fn close(&self) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventBus for ChannelBus {
    fn subscribe(&self) -> mpsc::UnboundedReceiver<HostEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }
}
