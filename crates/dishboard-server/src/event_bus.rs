//! Broadcast channel that fans mutation events out to connected clients.

use dishboard_protocol::{DishEvent, EventSink};
use log::debug;
use tokio::sync::broadcast;

/// Broadcast-backed event bus shared by the mutation service and the
/// WebSocket endpoint.
///
/// Subscribers only see events published after they subscribed; there is no
/// backlog. A subscriber that falls `capacity` events behind loses the
/// oldest ones.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<DishEvent>,
}

impl EventBus {
    /// Create a new event bus with the given per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        debug!("event bus initialized (capacity={})", capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DishEvent> {
        self.sender.subscribe()
    }

    /// Number of currently connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: DishEvent) {
        let name = event.name();
        let dish_id = event.dish_id().to_string();
        // Sending only fails when nobody is connected.
        let delivered = self.sender.send(event).unwrap_or(0);
        debug!(
            "published event (event={}, dish_id={}, subscribers={})",
            name, dish_id, delivered
        );
    }
}
