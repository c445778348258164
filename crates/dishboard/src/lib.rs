//! Public surface for dishboard.
//!
//! Re-exports the workspace crates and provides a logging helper so
//! embedders initialise the same way the `dishboard` binary does.

/// Re-export for convenience.
pub use dishboard_client as client;
pub use dishboard_config as config;
pub use dishboard_core as core;
/// Re-export for convenience.
pub use dishboard_protocol as protocol;
pub use dishboard_server as server;

mod render;

pub use render::{render_dishes, render_state};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}
