//! [`tracing`] related configuration.
//!
//! [`tracing`]: ::tracing

use {
	serde::{Deserialize, Deserializer, de},
	tracing_subscriber::{EnvFilter, filter::Directive},
};

/// Tracing configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TracingConfig
{
	/// Initialize a tracing subscriber.
	pub enable: bool,

	/// Emit ANSI escape codes for colors and other formatting.
	pub ansi: bool,

	/// Filter directives, on top of `RUST_LOG`.
	pub filters: Vec<Filter>,
}

impl TracingConfig
{
	/// Constructs an [`EnvFilter`] from the filter directives specified in the config.
	pub fn env_filter(&self) -> EnvFilter
	{
		self.filters
			.iter()
			.map(|Filter(directive)| directive.clone())
			.fold(EnvFilter::from_default_env(), EnvFilter::add_directive)
	}
}

/// A filter directive.
#[derive(Debug, Clone)]
pub struct Filter(pub Directive);

impl<'de> Deserialize<'de> for Filter
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer)?
			.parse()
			.map(Self)
			.map_err(de::Error::custom)
	}
}
