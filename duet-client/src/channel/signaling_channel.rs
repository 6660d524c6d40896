use crate::error::ChannelError;
use async_trait::async_trait;
use duet_core::SignalEvent;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

/// What a subscriber observes on the channel, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Signal(SignalEvent),
    /// The connection dropped. Emissions fail until `Reconnected`.
    Disconnected,
    /// A new connection replaced a dropped one. Server-side room state is gone.
    Reconnected,
}

/// Contract the core needs from the persistent signaling connection.
///
/// Implementations own connection lifecycle and reconnects; the core only
/// emits named events and consumes a subscription.
#[async_trait]
pub trait SignalingChannel: Send + Sync {
    /// Send one event. Fails with [`ChannelError::Unavailable`] while disconnected.
    async fn emit(&self, event: SignalEvent) -> Result<(), ChannelError>;

    /// Register a new subscriber. Every subscriber sees every inbound event.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ChannelEvent>;

    fn is_connected(&self) -> bool;
}

/// Fan-out list shared by channel implementations.
#[derive(Clone, Default)]
pub struct Subscribers {
    inner: Arc<Mutex<Vec<mpsc::UnboundedSender<ChannelEvent>>>>,
}

impl Subscribers {
    pub fn add(&self) -> mpsc::UnboundedReceiver<ChannelEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Deliver to every live subscriber, dropping the ones that went away.
    pub fn publish(&self, event: ChannelEvent) {
        let mut subscribers = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
