//! Broadcast events published after successful mutations.

use crate::{Dish, DishId};
use serde::{Deserialize, Serialize};

/// One completed mutation, delivered to every connected client.
///
/// Encoded as `{"event": "<kebab-name>", "data": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum DishEvent {
    /// A dish was inserted.
    #[serde(rename_all = "camelCase")]
    DishCreated { dish: Dish },
    /// A dish had some of its fields replaced.
    #[serde(rename_all = "camelCase")]
    DishUpdated { dish_id: DishId, dish: Dish },
    /// A dish was removed.
    #[serde(rename_all = "camelCase")]
    DishDeleted { dish_id: DishId },
    /// A dish had its publish flag flipped.
    #[serde(rename_all = "camelCase")]
    PublishStatusUpdated {
        dish_id: DishId,
        is_published: bool,
        dish: Dish,
    },
}

impl DishEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            DishEvent::DishCreated { .. } => "dish-created",
            DishEvent::DishUpdated { .. } => "dish-updated",
            DishEvent::DishDeleted { .. } => "dish-deleted",
            DishEvent::PublishStatusUpdated { .. } => "publish-status-updated",
        }
    }

    /// Identifier of the dish the event is about.
    pub fn dish_id(&self) -> &str {
        match self {
            DishEvent::DishCreated { dish } => &dish.dish_id,
            DishEvent::DishUpdated { dish_id, .. }
            | DishEvent::DishDeleted { dish_id }
            | DishEvent::PublishStatusUpdated { dish_id, .. } => dish_id,
        }
    }
}

/// Sink that mutation handlers publish events into.
pub trait EventSink: Send + Sync {
    /// Publish an event to every current subscriber.
    fn emit(&self, event: DishEvent);
}
