//! Local read-through cache of the dish collection.
//!
//! Applying an event is a pure transformation of the collection. Applying
//! the same `dish-updated` or `publish-status-updated` event twice leaves the
//! collection as it was after the first application, so the echo of a local
//! optimistic toggle is harmless.

use dishboard_protocol::{Dish, DishEvent, sort_by_name};

/// Lifecycle of the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// Snapshot fetch in flight.
    Loading,
    /// Snapshot loaded; events are being applied.
    Ready,
    /// Snapshot fetch failed; only a retry leaves this phase.
    Failed { message: String },
}

/// Ordered local copy of the server's dishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DishCollection {
    dishes: Vec<Dish>,
}

impl DishCollection {
    pub fn from_snapshot(mut dishes: Vec<Dish>) -> Self {
        sort_by_name(&mut dishes);
        Self { dishes }
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.dishes
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    pub fn get(&self, dish_id: &str) -> Option<&Dish> {
        self.dishes.iter().find(|dish| dish.dish_id == dish_id)
    }

    /// Apply one broadcast event. Returns whether the collection changed.
    pub fn apply(&mut self, event: &DishEvent) -> bool {
        match event {
            DishEvent::DishCreated { dish } => {
                if self.get(&dish.dish_id).is_some() {
                    return false;
                }
                self.dishes.push(dish.clone());
                sort_by_name(&mut self.dishes);
                true
            }
            DishEvent::DishUpdated { dish_id, dish } => {
                let Some(slot) = self.dishes.iter_mut().find(|d| &d.dish_id == dish_id) else {
                    return false;
                };
                if slot == dish {
                    return false;
                }
                *slot = dish.clone();
                sort_by_name(&mut self.dishes);
                true
            }
            DishEvent::DishDeleted { dish_id } => {
                let before = self.dishes.len();
                self.dishes.retain(|dish| &dish.dish_id != dish_id);
                before != self.dishes.len()
            }
            DishEvent::PublishStatusUpdated {
                dish_id,
                is_published,
                ..
            } => self.set_published(dish_id, *is_published),
        }
    }

    /// Set the publish flag on a record. Returns whether it changed.
    pub fn set_published(&mut self, dish_id: &str, is_published: bool) -> bool {
        match self.dishes.iter_mut().find(|dish| dish.dish_id == dish_id) {
            Some(dish) if dish.is_published != is_published => {
                dish.is_published = is_published;
                true
            }
            _ => false,
        }
    }
}
