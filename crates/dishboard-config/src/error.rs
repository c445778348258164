use thiserror::Error;

/// Failures while assembling a `DishboardConfig` from files and the
/// environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    ReadFailed(#[from] std::io::Error),
    #[error("config file is not valid JSON5: {0}")]
    ParseFailed(#[from] json5::Error),
    #[error("config does not match the dishboard schema: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// `store.url` names no known backend, or a jsonl URL has no directory.
    #[error("unsupported store url {url:?}: {reason}")]
    UnsupportedStoreUrl { url: String, reason: &'static str },
    /// A `DISHBOARD_*` variable holds a value its field cannot take.
    #[error("environment variable {var}={value:?} is invalid: {reason}")]
    InvalidEnv {
        var: String,
        value: String,
        reason: &'static str,
    },
    /// A field in a layer breaks a schema or range rule.
    #[error("invalid config at {path}: {message}")]
    InvalidField { path: String, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}
