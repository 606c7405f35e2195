//! Log subscriber setup

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the CLI verbosity
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter_directive()))
}

/// Install the global subscriber; logs go to stderr so stdout stays parseable.
///
/// Calling this twice is harmless: the second install is ignored.
pub fn init_logging(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(config.color.should_color());

    let installed = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, Verbosity};

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new()
            .with_verbosity(Verbosity::Quiet)
            .with_color(ColorChoice::Never);
        init_logging(&config);
        init_logging(&config.with_json_logs(true));
    }
}
