//! Reconnecting subscriber for the real-time channel.
//!
//! The subscriber forwards decoded events into an mpsc channel and exposes
//! its connection state through a `watch` channel. After a drop it retries a
//! bounded number of times with a fixed delay. Events published while
//! disconnected are not replayed.

use crate::error::ClientError;
use dishboard_config::ReconnectConfig;
use dishboard_protocol::DishEvent;
use futures_util::StreamExt;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Retry budget applied after the first connection attempt fails or an
/// established connection drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Never reconnect.
    pub fn never() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self::new(config.max_attempts, config.delay())
    }
}

/// Observable state of the real-time connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    /// Waiting before reconnect attempt `attempt` (1-based).
    Reconnecting { attempt: u32 },
    /// Gave up or stopped; no further events will arrive.
    Disconnected,
}

/// Handle to a running subscriber task.
pub struct Subscriber {
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl Subscriber {
    /// Start a subscriber that forwards events from `url` into `events`.
    ///
    /// The task stops when the retry budget is spent or when `events` is
    /// closed by the receiving side.
    pub fn spawn(url: String, policy: ReconnectPolicy, events: mpsc::Sender<DishEvent>) -> Self {
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let task = tokio::spawn(run(url, policy, events, state_tx));
        Self { state, task }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver notified on every connection state change.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Abort the subscriber task.
    pub fn stop(self) {
        self.task.abort();
    }
}

enum SessionEnd {
    /// Connection dropped or failed; a retry may follow.
    Dropped,
    /// The event consumer went away.
    ConsumerGone,
}

async fn run(
    url: String,
    policy: ReconnectPolicy,
    events: mpsc::Sender<DishEvent>,
    state: watch::Sender<ConnectionState>,
) {
    let mut attempt = 0;
    loop {
        match session(&url, &events, &state).await {
            Ok(SessionEnd::ConsumerGone) => break,
            Ok(SessionEnd::Dropped) => {
                // A session that reached Connected earns a fresh retry budget.
                attempt = 0;
                info!("real-time channel dropped (url={})", url);
            }
            Err(err) => warn!("real-time connect failed (url={}, error={})", url, err),
        }
        if attempt >= policy.max_attempts {
            break;
        }
        attempt += 1;
        state.send_replace(ConnectionState::Reconnecting { attempt });
        debug!(
            "reconnecting (attempt={}, delay_ms={})",
            attempt,
            policy.delay.as_millis()
        );
        tokio::time::sleep(policy.delay).await;
        state.send_replace(ConnectionState::Connecting);
    }
    state.send_replace(ConnectionState::Disconnected);
    info!("real-time channel closed (url={})", url);
}

async fn session(
    url: &str,
    events: &mpsc::Sender<DishEvent>,
    state: &watch::Sender<ConnectionState>,
) -> Result<SessionEnd, ClientError> {
    let (mut socket, _) = connect_async(url).await.map_err(Box::new)?;
    state.send_replace(ConnectionState::Connected);
    info!("real-time channel connected (url={})", url);

    while let Some(frame) = socket.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(err) => {
                warn!("real-time channel error (error={})", err);
                break;
            }
        };
        match serde_json::from_str::<DishEvent>(&text) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    return Ok(SessionEnd::ConsumerGone);
                }
            }
            Err(err) => warn!("dropping undecodable event (error={})", err),
        }
    }
    Ok(SessionEnd::Dropped)
}
