//! tracing-subscriber bootstrap for processes embedding clipcrypt

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{ClipcryptError, ClipcryptResult};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = ClipcryptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(ClipcryptError::Config(format!(
                "unknown log format {other:?} (expected \"json\" or \"text\")"
            ))),
        }
    }
}

/// Install the global subscriber described by `[logging]`.
pub fn init_from_config(config: &LoggingConfig) -> ClipcryptResult<()> {
    let format = config.format.parse()?;
    init_logging(&config.level, format)
}

/// Install a global subscriber. `RUST_LOG` takes precedence over `level`.
///
/// Fails instead of panicking when a global subscriber is already set.
pub fn init_logging(level: &str, format: LogFormat) -> ClipcryptResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| ClipcryptError::Logging(format!("invalid log filter {level:?}: {e}")))?;

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    };

    result.map_err(|e| ClipcryptError::Logging(e.to_string()))
}
