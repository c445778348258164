//! Configuration schema for dishboard.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root config shared by the server, the client, and the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DishboardConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl DishboardConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> DishboardConfigBuilder {
        DishboardConfigBuilder::new()
    }
}

/// Builder for assembling a `DishboardConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct DishboardConfigBuilder {
    config: DishboardConfig,
}

impl DishboardConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: DishboardConfig::default(),
        }
    }

    /// Replace the HTTP server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Replace the record store configuration.
    pub fn store(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Replace the broadcast channel configuration.
    pub fn broadcast(mut self, broadcast: BroadcastConfig) -> Self {
        self.config.broadcast = broadcast;
        self
    }

    /// Replace the client configuration.
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.config.client = client;
        self
    }

    /// Finalize and return the built `DishboardConfig`.
    pub fn build(self) -> DishboardConfig {
        self.config
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed to call the API from a browser and to open the
    /// real-time channel. `None` allows any origin.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

impl ServerConfig {
    /// Socket address string the listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store connection string: `memory://` or `jsonl://<directory>`.
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Optional JSON file of dishes inserted when the store starts empty.
    #[serde(default)]
    pub seed_path: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            seed_path: None,
        }
    }
}

fn default_store_url() -> String {
    "memory://".to_string()
}

/// Backend selected by a store connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local map; contents are lost on exit.
    Memory,
    /// Append-only JSONL log under the given directory.
    Jsonl { path: PathBuf },
}

impl StoreConfig {
    /// Resolve the connection string into a backend.
    pub fn backend(&self) -> Result<StoreBackend, ConfigError> {
        let url = self.url.trim();
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => (scheme, rest),
            None => (url, ""),
        };
        match scheme {
            "memory" if rest.is_empty() => Ok(StoreBackend::Memory),
            "jsonl" if !rest.is_empty() => Ok(StoreBackend::Jsonl {
                path: PathBuf::from(rest),
            }),
            "jsonl" => Err(ConfigError::UnsupportedStoreUrl {
                url: url.to_string(),
                reason: "jsonl store requires a directory path",
            }),
            _ => Err(ConfigError::UnsupportedStoreUrl {
                url: url.to_string(),
                reason: "expected memory:// or jsonl://<dir>",
            }),
        }
    }
}

/// Broadcast channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    /// Events buffered per subscriber before a slow subscriber starts
    /// missing events.
    #[serde(default = "default_broadcast_capacity")]
    pub capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            capacity: default_broadcast_capacity(),
        }
    }
}

fn default_broadcast_capacity() -> usize {
    1024
}

/// Client sync layer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API server.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Number of transient notices kept for display.
    #[serde(default = "default_notice_limit")]
    pub notice_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            reconnect: ReconnectConfig::default(),
            notice_limit: default_notice_limit(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_notice_limit() -> usize {
    5
}

/// Reconnect policy for the real-time channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconnectConfig {
    /// Reconnect attempts after a drop before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed delay between attempts, in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_delay_ms() -> u64 {
    1000
}
