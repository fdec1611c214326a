//! Change fan-out to connected viewers.
//!
//! Delivery is best-effort, at-most-once: no acknowledgment, no retry, no
//! replay. A viewer whose receiver lags past the channel capacity simply
//! misses events.

use crate::domain::events::ServerEvent;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct Broadcaster {
    tx: broadcast::Sender<ServerEvent>,
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Broadcaster { tx }
    }

    /// One receiver per viewer session.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Push an event to every live viewer. Never blocks and never fails:
    /// an error here only means nobody is connected.
    pub fn publish(&self, event: ServerEvent) {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(receivers) => debug!("event {} fanned out to {} viewer(s)", kind, receivers),
            Err(_) => debug!("event {} dropped, no viewers connected", kind),
        }
    }

    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
