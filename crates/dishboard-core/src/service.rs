//! Mutation API: validates requests, writes through the store, and publishes
//! one broadcast event per successful mutation.
//!
//! Events are emitted only after the store write returns successfully, so a
//! failed write never reaches subscribers. Toggle reads the current flag and
//! writes its complement without a compare-and-swap: two concurrent toggles
//! on the same dish race and both publish.

use crate::error::DishboardCoreError;
use crate::state::{DishStore, NewDish, StoreError};
use dishboard_protocol::{CreateDish, Dish, DishEvent, DishPatch, EventSink};
use log::{debug, info, warn};
use std::sync::Arc;

/// Message returned when a create body lacks a required field.
pub const MISSING_FIELDS_MESSAGE: &str = "Please provide dishId, dishName, and imageUrl";

/// Mutation service with an explicit publisher handle.
#[derive(Clone)]
pub struct DishService {
    store: Arc<dyn DishStore>,
    events: Arc<dyn EventSink>,
}

impl DishService {
    /// Create a service over a store and the sink events are published into.
    pub fn new(store: Arc<dyn DishStore>, events: Arc<dyn EventSink>) -> Self {
        Self { store, events }
    }

    /// All dishes ordered by name.
    pub fn list(&self) -> Result<Vec<Dish>, DishboardCoreError> {
        let dishes = self.store.list()?;
        debug!("listed dishes (count={})", dishes.len());
        Ok(dishes)
    }

    /// Insert a new dish and publish `dish-created`.
    pub fn create(&self, request: CreateDish) -> Result<Dish, DishboardCoreError> {
        let new_dish = validate_create(request)?;
        let dish = self.store.insert(new_dish).map_err(|err| match err {
            StoreError::DuplicateId(dish_id) => DishboardCoreError::AlreadyExists(dish_id),
            other => DishboardCoreError::Store(other),
        })?;
        info!(
            "created dish (dish_id={}, published={})",
            dish.dish_id, dish.is_published
        );
        self.events.emit(DishEvent::DishCreated { dish: dish.clone() });
        Ok(dish)
    }

    /// Apply the supplied fields and publish `dish-updated`.
    pub fn update(&self, dish_id: &str, patch: DishPatch) -> Result<Dish, DishboardCoreError> {
        validate_patch(&patch)?;
        if patch.is_empty() {
            debug!("empty patch; only updated_at changes (dish_id={})", dish_id);
        }
        let dish = self
            .store
            .update(dish_id, &patch)?
            .ok_or_else(|| DishboardCoreError::NotFound(dish_id.to_string()))?;
        info!("updated dish (dish_id={})", dish.dish_id);
        self.events.emit(DishEvent::DishUpdated {
            dish_id: dish.dish_id.clone(),
            dish: dish.clone(),
        });
        Ok(dish)
    }

    /// Remove a dish permanently and publish `dish-deleted`.
    pub fn delete(&self, dish_id: &str) -> Result<(), DishboardCoreError> {
        if !self.store.delete(dish_id)? {
            warn!("delete of unknown dish (dish_id={})", dish_id);
            return Err(DishboardCoreError::NotFound(dish_id.to_string()));
        }
        info!("deleted dish (dish_id={})", dish_id);
        self.events.emit(DishEvent::DishDeleted {
            dish_id: dish_id.to_string(),
        });
        Ok(())
    }

    /// Flip the publish flag and publish `publish-status-updated`.
    pub fn toggle(&self, dish_id: &str) -> Result<Dish, DishboardCoreError> {
        let current = self
            .store
            .get(dish_id)?
            .ok_or_else(|| DishboardCoreError::NotFound(dish_id.to_string()))?;
        let patch = DishPatch::publish_status(!current.is_published);
        let dish = self
            .store
            .update(dish_id, &patch)?
            .ok_or_else(|| DishboardCoreError::NotFound(dish_id.to_string()))?;
        info!(
            "toggled dish (dish_id={}, published={})",
            dish.dish_id, dish.is_published
        );
        self.events.emit(DishEvent::PublishStatusUpdated {
            dish_id: dish.dish_id.clone(),
            is_published: dish.is_published,
            dish: dish.clone(),
        });
        Ok(dish)
    }

    /// Insert dishes without publishing; existing ids are skipped.
    ///
    /// Used to populate an empty store at startup, before any client is
    /// connected. Every entry is validated before the first insert, so an
    /// invalid entry leaves the store untouched.
    pub fn seed(&self, requests: Vec<CreateDish>) -> Result<usize, DishboardCoreError> {
        let new_dishes = requests
            .into_iter()
            .map(validate_create)
            .collect::<Result<Vec<_>, _>>()?;
        let mut inserted = 0;
        for new_dish in new_dishes {
            match self.store.insert(new_dish) {
                Ok(_) => inserted += 1,
                Err(StoreError::DuplicateId(dish_id)) => {
                    debug!("seed skipped existing dish (dish_id={})", dish_id);
                }
                Err(err) => return Err(err.into()),
            }
        }
        info!("seeded dishes (inserted={})", inserted);
        Ok(inserted)
    }
}

/// Check required create fields and apply the publish default.
fn validate_create(request: CreateDish) -> Result<NewDish, DishboardCoreError> {
    let (Some(dish_id), Some(dish_name), Some(image_url)) = (
        non_blank(request.dish_id),
        non_blank(request.dish_name),
        non_blank(request.image_url),
    ) else {
        return Err(DishboardCoreError::Validation(
            MISSING_FIELDS_MESSAGE.to_string(),
        ));
    };
    Ok(NewDish {
        dish_id,
        dish_name,
        image_url,
        is_published: request.is_published.unwrap_or(false),
    })
}

/// Supplied required fields must stay non-empty.
fn validate_patch(patch: &DishPatch) -> Result<(), DishboardCoreError> {
    if patch
        .dish_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(DishboardCoreError::Validation(
            "dishName cannot be empty".to_string(),
        ));
    }
    if patch
        .image_url
        .as_deref()
        .is_some_and(|url| url.trim().is_empty())
    {
        return Err(DishboardCoreError::Validation(
            "imageUrl cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
