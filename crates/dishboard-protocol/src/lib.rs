//! Wire protocol types for dishes, mutation requests, broadcast events, and
//! response envelopes.

mod envelope;
mod event;
mod ordering;

pub use envelope::{DataResponse, Empty, ErrorResponse, HealthResponse, ListResponse};
pub use event::{DishEvent, EventSink};
pub use ordering::{compare_by_name, compare_names, sort_by_name};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Externally assigned identifier of a dish.
pub type DishId = String;

/// A dish record as owned by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    /// Unique, immutable identifier assigned by the creator.
    pub dish_id: DishId,
    /// Display name.
    pub dish_name: String,
    /// Image location.
    pub image_url: String,
    /// Whether the dish is visible to the public.
    #[serde(default)]
    pub is_published: bool,
    /// Store-managed creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Store-managed last write timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Body of a create request.
///
/// Required fields are optional here so that a missing field surfaces as a
/// validation failure rather than a decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDish {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_id: Option<DishId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl CreateDish {
    /// Build a create body with all required fields.
    pub fn new(
        dish_id: impl Into<String>,
        dish_name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            dish_id: Some(dish_id.into()),
            dish_name: Some(dish_name.into()),
            image_url: Some(image_url.into()),
            is_published: None,
        }
    }

    /// Set the initial publish flag.
    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }
}

/// Partial update of a dish; only supplied fields are applied.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DishPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dish_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

impl DishPatch {
    /// Patch that only sets the publish flag.
    pub fn publish_status(is_published: bool) -> Self {
        Self {
            is_published: Some(is_published),
            ..Self::default()
        }
    }

    /// Whether the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.dish_name.is_none() && self.image_url.is_none() && self.is_published.is_none()
    }

    /// Apply supplied fields onto a dish, leaving the rest untouched.
    pub fn apply_to(&self, dish: &mut Dish) {
        if let Some(name) = &self.dish_name {
            dish.dish_name = name.clone();
        }
        if let Some(url) = &self.image_url {
            dish.image_url = url.clone();
        }
        if let Some(is_published) = self.is_published {
            dish.is_published = is_published;
        }
    }
}
