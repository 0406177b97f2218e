//! Configuration for the [`ExceptionHandler`].
//!
//! Everything here is plain data deserialized from TOML; [`ExceptionHandler::from_config()`]
//! validates it and fails fast on anything it cannot use.
//!
//! [`ExceptionHandler`]: crate::ExceptionHandler
//! [`ExceptionHandler::from_config()`]: crate::ExceptionHandler::from_config

use {
	crate::{
		hooks::StripExtrasPostHook,
		wrappers::{InvalidWrapperKey, ProblemTemplate, UnhandledWrappers, WrapperKey},
	},
	http::StatusCode,
	problem_details::{PhraseTable, STATUS_RANGE, TYPE_PLACEHOLDER, WireFormat},
	serde::Deserialize,
	std::{
		collections::BTreeMap,
		fs,
		io,
		path::{Path, PathBuf},
	},
	thiserror::Error,
};

mod cors;
pub mod tracing;

pub use self::{cors::CorsConfig, tracing::TracingConfig};

/// Errors that can occur when loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError
{
	#[error("failed to read configuration file at {path:?}")]
	Io
	{
		path: PathBuf,

		#[source]
		source: io::Error,
	},

	#[error("failed to parse configuration")]
	Parse(#[from] toml::de::Error),

	#[error(transparent)]
	InvalidWrapperKey(#[from] InvalidWrapperKey),

	#[error("`{0}` is not a valid HTTP status code")]
	InvalidStatus(u16),

	#[error("invalid CORS {field} `{value}`")]
	InvalidCors
	{
		field: &'static str,
		value: String,
	},
}

/// The complete configuration, usually read from a TOML file with [`Config::load()`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config
{
	/// Only emit `type`, `title` and `status`.
	pub strip_debug: bool,

	/// Only emit `type`, `title` and `status` for these status codes.
	pub strip_debug_codes: Vec<u16>,

	/// Always emit `about:blank` as the problem type.
	pub strict_rfc9457: bool,

	/// Turns type tokens into documentation links; `{type}` is replaced by the token.
	pub documentation_uri_template: Option<String>,

	/// Shorthand for a template of `{documentation-base-url}{type}`.
	///
	/// Ignored if `documentation-uri-template` is set.
	pub documentation_base_url: Option<String>,

	/// Which reason phrases become titles of HTTP exceptions.
	pub phrase_table: PhraseTable,

	/// The JSON shape of response bodies.
	pub wire_format: WireFormat,

	/// Add generic `4XX` / `5XX` responses to every OpenAPI operation.
	pub generic_openapi_defaults: bool,

	/// Echo allowed origins on error responses.
	pub cors: Option<CorsConfig>,

	/// Wrapper templates keyed by `default` or a status code.
	///
	/// Keys are validated by [`Config::unhandled_wrappers()`].
	pub unhandled_wrappers: BTreeMap<String, ProblemTemplate>,

	pub strip_extras: StripExtrasConfig,

	/// Only used by the demo server.
	pub tracing: TracingConfig,
}

impl Default for Config
{
	fn default() -> Self
	{
		Self {
			strip_debug: false,
			strip_debug_codes: Vec::new(),
			strict_rfc9457: false,
			documentation_uri_template: None,
			documentation_base_url: None,
			phrase_table: PhraseTable::default(),
			wire_format: WireFormat::default(),
			generic_openapi_defaults: true,
			cors: None,
			unhandled_wrappers: BTreeMap::new(),
			strip_extras: StripExtrasConfig::default(),
			tracing: TracingConfig::default(),
		}
	}
}

impl Config
{
	/// Reads and parses a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError>
	{
		let path = path.as_ref();
		let file = fs::read_to_string(path)
			.map_err(|source| ConfigError::Io { path: path.to_owned(), source })?;

		Self::from_toml(&file)
	}

	/// Parses TOML source text.
	pub fn from_toml(toml: &str) -> Result<Self, ConfigError>
	{
		toml::from_str(toml).map_err(ConfigError::from)
	}

	/// The documentation URI template, taking `documentation-base-url` into account.
	pub fn documentation_uri_template(&self) -> Option<String>
	{
		self.documentation_uri_template
			.clone()
			.filter(|template| !template.is_empty())
			.or_else(|| {
				self.documentation_base_url
					.as_deref()
					.filter(|base_url| !base_url.is_empty())
					.map(|base_url| format!("{base_url}{TYPE_PLACEHOLDER}"))
			})
	}

	/// Builds the wrapper table, validating its keys.
	pub fn unhandled_wrappers(&self) -> Result<UnhandledWrappers, ConfigError>
	{
		self.unhandled_wrappers
			.iter()
			.map(|(key, template)| -> Result<_, ConfigError> {
				Ok((key.parse::<WrapperKey>()?, template.clone()))
			})
			.collect()
	}

	/// Validates `strip-debug-codes`.
	pub fn strip_debug_codes(&self) -> Result<Vec<StatusCode>, ConfigError>
	{
		parse_status_codes(&self.strip_debug_codes)
	}
}

/// Removing extension members from responses with certain status codes.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct StripExtrasConfig
{
	/// Whether the post-hook is installed at all.
	pub enabled: bool,

	/// The status codes whose responses are trimmed.
	pub codes: Vec<u16>,
}

impl StripExtrasConfig
{
	/// Builds the post-hook, validating `codes`.
	pub fn post_hook(&self) -> Result<StripExtrasPostHook, ConfigError>
	{
		Ok(StripExtrasPostHook::new(self.enabled, parse_status_codes(&self.codes)?))
	}
}

fn parse_status_codes(codes: &[u16]) -> Result<Vec<StatusCode>, ConfigError>
{
	codes
		.iter()
		.map(|&code| {
			Some(code)
				.filter(|code| STATUS_RANGE.contains(code))
				.and_then(|code| StatusCode::from_u16(code).ok())
				.ok_or(ConfigError::InvalidStatus(code))
		})
		.collect()
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert, assert_eq, assert_matches},
	};

	const FULL: &str = r#"
		strip-debug = false
		strip-debug-codes = [500]
		strict-rfc9457 = false
		documentation-base-url = "https://docs.example.org/errors/"
		phrase-table = "rfc9110"
		wire-format = "rfc9457"
		generic-openapi-defaults = false

		[cors]
		allow-origins = ["*"]
		allow-methods = ["*"]
		allow-headers = ["*"]
		allow-credentials = true

		[unhandled-wrappers.default]
		type = "custom-server"
		title = "Server failed."
		status = 500

		[unhandled-wrappers.404]
		type = "custom-not-found"
		title = "Endpoint not available."
		status = 404

		[strip-extras]
		enabled = true
		codes = [422]

		[tracing]
		enable = true
		filters = ["problem_responder=debug"]
	"#;

	#[test]
	fn parse_full_config() -> Result
	{
		let config = Config::from_toml(FULL)?;

		assert_eq!(config.strip_debug_codes()?, [StatusCode::INTERNAL_SERVER_ERROR]);
		assert_eq!(config.phrase_table, PhraseTable::Rfc9110);
		assert!(!config.generic_openapi_defaults);
		assert_eq!(
			config.documentation_uri_template().as_deref(),
			Some("https://docs.example.org/errors/{type}")
		);
		assert_eq!(config.unhandled_wrappers()?.len(), 2);
		assert!(config.cors.as_ref().is_some_and(CorsConfig::allows_all_origins));
		assert_eq!(config.tracing.filters.len(), 1);

		Ok(())
	}

	#[test]
	fn defaults() -> Result
	{
		let config = Config::from_toml("")?;

		assert!(config.generic_openapi_defaults);
		assert!(config.cors.is_none());
		assert_eq!(config.documentation_uri_template(), None);
		assert_eq!(config.wire_format, WireFormat::Rfc9457);

		Ok(())
	}

	#[test]
	fn invalid_configs_fail_fast() -> Result
	{
		let bad_key = Config::from_toml(
			"[unhandled-wrappers.teapot]\ntype = \"x\"\ntitle = \"X\"\nstatus = 418",
		)?;
		let out_of_range_key = Config::from_toml(
			"[unhandled-wrappers.799]\ntype = \"x\"\ntitle = \"X\"\nstatus = 500",
		)?;
		let bad_code = Config::from_toml("strip-debug-codes = [42]")?;

		assert_matches!(bad_key.unhandled_wrappers(), Err(ConfigError::InvalidWrapperKey(_)));
		assert_matches!(
			out_of_range_key.unhandled_wrappers(),
			Err(ConfigError::InvalidWrapperKey(_))
		);
		assert_matches!(bad_code.strip_debug_codes(), Err(ConfigError::InvalidStatus(42)));
		assert_matches!(Config::from_toml("strip-debugg = true"), Err(ConfigError::Parse(_)));
		assert_matches!(Config::load("/this/does/not/exist.toml"), Err(ConfigError::Io { .. }));

		Ok(())
	}
}
