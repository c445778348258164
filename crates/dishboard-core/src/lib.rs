//! Core mutation primitives for dishboard.
//!
//! This crate owns the record store abstraction and its backends, and the
//! mutation service that writes through the store and publishes one
//! broadcast event per successful mutation.

pub mod error;
pub mod seed;
pub mod service;
pub mod state;

pub use dishboard_protocol::EventSink;
pub use error::{DishboardCoreError, ErrorKind};
pub use service::DishService;
pub use state::{DishStore, JsonlDishStore, MemoryDishStore, NewDish, StoreError, open_store};
