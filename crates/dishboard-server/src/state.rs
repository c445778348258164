use crate::event_bus::EventBus;
use axum::http::HeaderValue;
use dishboard_core::DishService;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared handles cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub service: DishService,
    pub events: EventBus,
    /// Origin allowed to open the real-time channel; `None` allows all.
    pub allowed_origin: Option<HeaderValue>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    pub fn new(service: DishService, events: EventBus) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            service,
            events,
            allowed_origin: None,
            shutdown: Arc::new(shutdown),
        }
    }

    pub fn with_allowed_origin(mut self, origin: Option<HeaderValue>) -> Self {
        self.allowed_origin = origin;
        self
    }

    /// Whether a request carrying `origin` may open the real-time channel.
    ///
    /// Requests without an `Origin` header are non-browser clients and are
    /// always accepted.
    pub fn origin_allowed(&self, origin: Option<&HeaderValue>) -> bool {
        match (&self.allowed_origin, origin) {
            (Some(allowed), Some(origin)) => allowed == origin,
            _ => true,
        }
    }

    /// Ask every open real-time connection to close.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub(crate) fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}
