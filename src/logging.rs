//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr so stdout stays reserved for menus, diffs and
//! prompts. `RUST_LOG` takes precedence over the configured level:
//!
//! ```bash
//! RUST_LOG=debug mastodon_toolkit tags import
//! RUST_LOG=mastodon_toolkit::api_utils=debug mastodon_toolkit filters export
//! ```

use tracing_subscriber::EnvFilter;

pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
