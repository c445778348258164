//! Client sync layer for dishboard: a typed REST client, a local collection
//! kept current by broadcast events, and a reconnecting subscriber.

pub mod api;
pub mod dashboard;
pub mod error;
pub mod notice;
pub mod subscriber;
pub mod sync;

pub use api::DishClient;
pub use dashboard::Dashboard;
pub use error::ClientError;
pub use notice::{Notice, NoticeLevel, NoticeQueue};
pub use subscriber::{ConnectionState, ReconnectPolicy, Subscriber};
pub use sync::{DishCollection, SyncPhase};
