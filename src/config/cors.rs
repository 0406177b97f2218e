use {
	super::ConfigError,
	http::{HeaderName, HeaderValue, Method},
	serde::Deserialize,
	tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders},
};

const WILDCARD: &str = "*";

/// Cross-origin resource sharing settings.
///
/// These drive both the [`CorsPostHook`] for error responses and, through [`layer()`], the
/// regular CORS middleware.
///
/// [`CorsPostHook`]: crate::hooks::CorsPostHook
/// [`layer()`]: CorsConfig::layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct CorsConfig
{
	/// Allowed origins; `*` allows all of them.
	pub allow_origins: Vec<String>,

	/// Methods the CORS middleware allows.
	pub allow_methods: Vec<String>,

	/// Request headers the CORS middleware allows.
	pub allow_headers: Vec<String>,

	/// Whether to send `Access-Control-Allow-Credentials: true`.
	pub allow_credentials: bool,

	/// Response headers exposed to scripts.
	pub expose_headers: Vec<String>,
}

impl Default for CorsConfig
{
	fn default() -> Self
	{
		Self {
			allow_origins: Vec::new(),
			allow_methods: vec![Method::GET.to_string()],
			allow_headers: Vec::new(),
			allow_credentials: false,
			expose_headers: Vec::new(),
		}
	}
}

impl CorsConfig
{
	/// Whether `allow-origins` contains `*`.
	pub fn allows_all_origins(&self) -> bool
	{
		self.allow_origins.iter().any(|origin| origin == WILDCARD)
	}

	/// The explicitly allowed origins as header values.
	pub fn origin_values(&self) -> impl Iterator<Item = HeaderValue> + '_
	{
		self.allow_origins
			.iter()
			.filter(|origin| *origin != WILDCARD)
			.filter_map(|origin| HeaderValue::try_from(origin.as_str()).ok())
	}

	/// The value of `Access-Control-Expose-Headers`, if any headers are exposed.
	pub fn expose_headers_value(&self) -> Option<HeaderValue>
	{
		if self.expose_headers.is_empty() {
			return None;
		}

		HeaderValue::try_from(self.expose_headers.join(", ")).ok()
	}

	/// Checks that every origin, method and header is usable.
	pub fn validate(&self) -> Result<(), ConfigError>
	{
		fn check<T>(field: &'static str, values: &[String]) -> Result<(), ConfigError>
		where
			T: for<'a> TryFrom<&'a str>,
		{
			match values
				.iter()
				.find(|value| *value != WILDCARD && T::try_from(value.as_str()).is_err())
			{
				None => Ok(()),
				Some(value) => Err(ConfigError::InvalidCors { field, value: value.clone() }),
			}
		}

		check::<HeaderValue>("origin", &self.allow_origins)?;
		check::<Method>("method", &self.allow_methods)?;
		check::<HeaderName>("header", &self.allow_headers)?;
		check::<HeaderName>("exposed header", &self.expose_headers)?;

		Ok(())
	}

	/// Builds a [`CorsLayer`] applying the same rules to regular responses.
	///
	/// Wildcards are mirrored from the request when credentials are allowed, since browsers reject
	/// `*` in that case.
	pub fn layer(&self) -> CorsLayer
	{
		let mirror = self.allow_credentials;

		let allow_origin = match (self.allows_all_origins(), mirror) {
			(true, true) => AllowOrigin::mirror_request(),
			(true, false) => AllowOrigin::any(),
			(false, _) => AllowOrigin::list(self.origin_values()),
		};

		let allow_methods = match (has_wildcard(&self.allow_methods), mirror) {
			(true, true) => AllowMethods::mirror_request(),
			(true, false) => AllowMethods::any(),
			(false, _) => AllowMethods::list(
				self.allow_methods
					.iter()
					.filter_map(|method| method.parse::<Method>().ok()),
			),
		};

		let allow_headers = match (has_wildcard(&self.allow_headers), mirror) {
			(true, true) => AllowHeaders::mirror_request(),
			(true, false) => AllowHeaders::any(),
			(false, _) => AllowHeaders::list(header_names(&self.allow_headers)),
		};

		let expose_headers = match (has_wildcard(&self.expose_headers), mirror) {
			(true, false) => ExposeHeaders::any(),
			(true, true) | (false, _) => ExposeHeaders::list(header_names(&self.expose_headers)),
		};

		CorsLayer::new()
			.allow_origin(allow_origin)
			.allow_methods(allow_methods)
			.allow_headers(allow_headers)
			.allow_credentials(self.allow_credentials)
			.expose_headers(expose_headers)
	}
}

fn has_wildcard(values: &[String]) -> bool
{
	values.iter().any(|value| value == WILDCARD)
}

fn header_names(values: &[String]) -> impl Iterator<Item = HeaderName> + '_
{
	values
		.iter()
		.filter(|value| *value != WILDCARD)
		.filter_map(|value| value.parse::<HeaderName>().ok())
}
