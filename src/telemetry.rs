//! Subscriber setup for binaries embedding the engine.

use {
	crate::config::TracingConfig,
	std::io,
	tracing_subscriber::{Layer, layer::SubscriberExt, util::{SubscriberInitExt, TryInitError}},
};

/// Installs a global subscriber logging to stderr.
///
/// Does nothing if tracing is disabled in `config`.
pub fn init(config: &TracingConfig) -> Result<(), TryInitError>
{
	if !config.enable {
		return Ok(());
	}

	let stderr = tracing_subscriber::fmt::layer()
		.pretty()
		.with_ansi(config.ansi)
		.with_file(true)
		.with_line_number(true)
		.with_target(true)
		.with_writer(io::stderr)
		.with_filter(config.env_filter());

	tracing_subscriber::registry().with(stderr).try_init()?;

	info!("initialized tracing");

	Ok(())
}
