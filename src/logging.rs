//! Diagnostic logging.
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout to the run's
//! progress output. The level comes from `-v` flags unless
//! `RESPONSIVE_IMAGES_LOG` holds a filter directive, which wins:
//!
//! | Flags | Level |
//! |---|---|
//! | none | `warn` |
//! | `-v` | `info` |
//! | `-vv` | `debug` |
//! | `-vvv` | `trace` |

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

pub const LOG_ENV: &str = "RESPONSIVE_IMAGES_LOG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(verbosity: u8, format: LogFormat) -> Result<(), TryInitError> {
    let registry = Registry::default().with(build_filter(verbosity));
    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    }
}
