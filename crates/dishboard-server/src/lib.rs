//! HTTP and WebSocket surface for dishboard.
//!
//! The REST handlers call the mutation service, which publishes every
//! successful mutation into the [`EventBus`]; each WebSocket connection
//! subscribes to that bus and forwards events as JSON text frames.

pub mod error;
pub mod event_bus;
mod middleware;
pub mod routes;
pub mod state;
mod ws;

pub use error::{ApiError, ServerError};
pub use event_bus::EventBus;
pub use state::AppState;

use axum::Router;
use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use axum::routing::{get, put};
use dishboard_config::DishboardConfig;
use dishboard_core::seed::seed_if_empty;
use dishboard_core::{DishService, open_store};
use log::info;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Build the application router over shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.allowed_origin.clone());
    Router::new()
        .route(
            "/api/dishes",
            get(routes::list_dishes).post(routes::create_dish),
        )
        .route(
            "/api/dishes/{dish_id}",
            put(routes::update_dish).delete(routes::delete_dish),
        )
        .route("/api/dishes/{dish_id}/toggle", put(routes::toggle_dish))
        .route("/api/health", get(routes::health))
        .route("/ws", get(ws::upgrade))
        .fallback(routes::route_not_found)
        .method_not_allowed_fallback(routes::route_not_found)
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(state)
}

fn cors_layer(allowed_origin: Option<HeaderValue>) -> CorsLayer {
    match allowed_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    }
}

/// Open the configured store, seed it when empty, and wire the event bus.
pub fn build_state(config: &DishboardConfig) -> Result<AppState, ServerError> {
    config.validate()?;
    let backend = config.store.backend()?;
    let store = open_store(&backend)?;
    let events = EventBus::new(config.broadcast.capacity);
    let service = DishService::new(store, Arc::new(events.clone()));

    if let Some(seed_path) = config.store.seed_path.as_deref() {
        let inserted = seed_if_empty(&service, seed_path)?;
        info!("seed applied (path={}, inserted={})", seed_path, inserted);
    }

    let allowed_origin = config
        .server
        .allowed_origin
        .as_deref()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ServerError::InvalidOrigin(origin.to_string()))
        })
        .transpose()?;

    Ok(AppState::new(service, events).with_allowed_origin(allowed_origin))
}

/// A bound listener ready to serve the dishboard API.
pub struct DishServer {
    listener: TcpListener,
    state: AppState,
}

impl DishServer {
    /// Build state from config and bind the configured address.
    pub async fn bind(config: &DishboardConfig) -> Result<Self, ServerError> {
        let state = build_state(config)?;
        let listener = TcpListener::bind(config.server.bind_address()).await?;
        Ok(Self { listener, state })
    }

    /// Bind an explicit address with prepared state.
    pub async fn bind_with_state(address: &str, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until `shutdown` resolves, then close open real-time
    /// connections and drain in-flight requests.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = self.local_addr()?;
        info!("server listening (address={})", address);
        let state = self.state.clone();
        axum::serve(self.listener, router(self.state))
            .with_graceful_shutdown(async move {
                shutdown.await;
                state.begin_shutdown();
            })
            .await?;
        info!("server stopped");
        Ok(())
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
