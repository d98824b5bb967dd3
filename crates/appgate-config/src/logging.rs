// Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::ConfigError;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(debug: bool) -> &'static str {
    if debug {
        "warn,appgate_api=debug,appgate_core=debug"
    } else {
        "warn"
    }
}

/// Install a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` always wins over `debug`. Fails if a subscriber is already
/// installed.
pub fn init_tracing(debug: bool, json: bool) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(debug)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| ConfigError::Logging(e.to_string()))
}
