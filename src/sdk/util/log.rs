use env_logger::{Builder, Env};
use std::env;

/// Sets up `env_logger`. `RUST_LOG` wins over `default_level`; calling twice is harmless.
pub fn init_logging(default_level: &str) {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    let _ = Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .format_module_path(false)
        .try_init();
}
