//! Layered configuration loader.
//!
//! Discovers configuration layers (user, cwd, runtime files, environment),
//! validates their schema, merges them, and produces a final
//! `DishboardConfig`.

mod env;
mod layer_io;
mod merge;
mod schema;


use crate::{ConfigError, DishboardConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in local layers.
const DEFAULT_CONFIG_FILE: &str = "dishboard.json5";
/// Default config directory under the user's home.
const DEFAULT_CONFIG_DIR: &str = ".dishboard";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: DishboardConfig,
    /// Metadata for each layer applied during load.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// User-specific configuration.
    User,
    /// Current working directory configuration.
    Cwd,
    /// Explicit config files passed at runtime.
    Runtime,
    /// `DISHBOARD_*` environment variables (highest precedence).
    Environment,
}

/// Metadata about an applied config layer.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    /// Layer origin.
    pub source: ConfigLayerSource,
    /// Location on disk, if the layer came from a file.
    pub path: Option<PathBuf>,
}

/// Options controlling layered config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd layer.
    pub cwd: PathBuf,
    /// Optional user config path (defaults to `~/.dishboard/dishboard.json5`).
    pub user_config_path: Option<PathBuf>,
    /// Runtime config paths applied after the file layers.
    pub runtime_paths: Vec<PathBuf>,
    /// Environment variables consulted for overrides.
    pub environment: BTreeMap<String, String>,
}

impl LayeredConfigOptions {
    /// Create options with default layer locations and the process
    /// environment.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            user_config_path: layer_io::default_user_config_path(),
            runtime_paths: Vec::new(),
            environment: env::capture_process_env(),
        }
    }

    /// Add a runtime config path that is applied after the file layers.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Replace the environment consulted for overrides.
    pub fn with_environment<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.environment = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }
}

impl DishboardConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        let value: Value = json5::from_str(&contents)?;
        config_from_value(value, "config")
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load a layered config stack using the default layer locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        info!(
            "loading layered config with defaults (cwd={})",
            cwd.as_ref().display()
        );
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load a layered config stack using explicit layer locations.
    ///
    /// Layer precedence (low -> high): user, cwd, runtime files, environment.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let mut layers = Vec::new();
        let mut merged = Value::Object(serde_json::Map::new());
        let mut seen_paths = HashSet::new();

        let mut file_layers = Vec::new();
        if let Some(path) = options.user_config_path.clone() {
            file_layers.push((ConfigLayerSource::User, path, false));
        }
        file_layers.push((
            ConfigLayerSource::Cwd,
            options.cwd.join(DEFAULT_CONFIG_FILE),
            false,
        ));
        for path in &options.runtime_paths {
            file_layers.push((ConfigLayerSource::Runtime, path.clone(), true));
        }

        for (source, path, required) in file_layers {
            let loaded = if required {
                Some(layer_io::load_required_layer(source, &path)?)
            } else {
                layer_io::load_optional_layer(source, Some(&path))?
            };
            let Some(loaded) = loaded else {
                continue;
            };
            let unique = path.canonicalize().unwrap_or_else(|_| path.clone());
            if !seen_paths.insert(unique) {
                debug!(
                    "skipping duplicate layer (source={:?}, path={})",
                    source,
                    path.display()
                );
                continue;
            }
            merge::merge_json_values(&mut merged, &loaded.value);
            layers.push(loaded.meta);
        }

        if let Some(overlay) = env::environment_overlay(&options.environment)? {
            debug!("applying environment overrides");
            merge::merge_json_values(&mut merged, &overlay);
            layers.push(ConfigLayer {
                source: ConfigLayerSource::Environment,
                path: None,
            });
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.backend()?;
        if self.broadcast.capacity == 0 {
            return Err(ConfigError::InvalidField {
                path: "broadcast.capacity".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.client.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "client.api_url cannot be empty".to_string(),
            ));
        }
        if let Some(origin) = &self.server.allowed_origin
            && origin.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "server.allowed_origin cannot be empty when set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Internal representation of a loaded config layer.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<DishboardConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let mut normalized = Value::Object(serde_json::Map::new());
    merge::merge_json_values(&mut normalized, &value);
    let config: DishboardConfig = serde_json::from_value(normalized)?;
    config.validate()?;
    Ok(config)
}
