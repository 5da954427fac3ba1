//! Tracing subscriber setup for the server binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,tower_http=debug,sqlx=warn";

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default filter. `format` is `json` for one JSON
/// object per line; anything else logs compact text without targets.
pub fn init(format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let fmt_layer = fmt::layer().with_target(false).with_level(true);

    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.compact())
            .try_init()?;
    }

    Ok(())
}
