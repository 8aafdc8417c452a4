use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
	/// Default filter directive, `RUST_LOG` takes precedence when set.
	pub level: String,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
		}
	}
}

/// Installs the global subscriber. Calling it again is harmless, the first subscriber
/// stays in place.
pub fn init(config: &LoggingConfig) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(&config.level))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	if let Err(e) = tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_target(true)
				.with_thread_ids(true)
				.with_line_number(true),
		)
		.try_init()
	{
		debug!(%e, "Logging was already initialized;");
	}
}
