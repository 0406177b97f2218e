//! Adds CORS headers to error responses.
//!
//! Error responses are often produced outside of the regular CORS middleware (e.g. after a panic
//! or when routing fails), which leaves browsers with an opaque network error instead of the
//! problem document. This hook applies the same simple-response rules the middleware would.

use {
	super::PostHook,
	crate::{config::CorsConfig, response::ProblemResponse},
	http::{HeaderValue, header, request},
	std::sync::Arc,
};

/// A post-hook echoing allowed origins on error responses.
#[derive(Debug, Clone)]
pub struct CorsPostHook
{
	allow_all_origins: bool,
	allowed_origins: Arc<[HeaderValue]>,
	simple_headers: Arc<[(header::HeaderName, HeaderValue)]>,
}

impl CorsPostHook
{
	/// Creates a new [`CorsPostHook`] from the given configuration.
	pub fn new(config: &CorsConfig) -> Self
	{
		let allow_all_origins = config.allows_all_origins();
		let mut simple_headers = Vec::new();

		if allow_all_origins {
			simple_headers
				.push((header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")));
		}

		if config.allow_credentials {
			simple_headers
				.push((header::ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true")));
		}

		if let Some(expose_headers) = config.expose_headers_value() {
			simple_headers.push((header::ACCESS_CONTROL_EXPOSE_HEADERS, expose_headers));
		}

		Self {
			allow_all_origins,
			allowed_origins: config.origin_values().collect(),
			simple_headers: simple_headers.into(),
		}
	}

	fn is_allowed_origin(&self, origin: &HeaderValue) -> bool
	{
		self.allow_all_origins || self.allowed_origins.contains(origin)
	}
}

impl PostHook for CorsPostHook
{
	fn run(&self, request: &request::Parts, mut response: ProblemResponse) -> ProblemResponse
	{
		let Some(origin) = request.headers.get(header::ORIGIN) else {
			return response;
		};

		for (name, value) in &*self.simple_headers {
			response.headers.insert(name.clone(), value.clone());
		}

		let has_cookie = request.headers.contains_key(header::COOKIE);

		if self.allow_all_origins && has_cookie {
			response.headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
		} else if !self.allow_all_origins && self.is_allowed_origin(origin) {
			response.headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
			add_vary_origin(&mut response.headers);
		}

		response
	}
}

fn add_vary_origin(headers: &mut http::HeaderMap)
{
	let vary = match headers.get(header::VARY).and_then(|vary| vary.to_str().ok()) {
		None => HeaderValue::from_static("Origin"),
		Some(vary) if vary.split(',').any(|value| value.trim().eq_ignore_ascii_case("origin")) => {
			return;
		},
		Some(vary) => match HeaderValue::try_from(format!("{vary}, Origin")) {
			Ok(vary) => vary,
			Err(_) => return,
		},
	};

	headers.insert(header::VARY, vary);
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{self, Result, assert, assert_eq},
		http::StatusCode,
		serde_json::Map,
	};

	fn config(origins: &[&str]) -> CorsConfig
	{
		CorsConfig {
			allow_origins: origins.iter().map(|&origin| origin.to_owned()).collect(),
			allow_credentials: true,
			..CorsConfig::default()
		}
	}

	fn run(hook: &CorsPostHook, headers: &[(&str, &str)]) -> Result<http::HeaderMap>
	{
		let request = testing::request_parts("/", headers)?;
		let response = ProblemResponse::new(StatusCode::INTERNAL_SERVER_ERROR, Map::new());

		Ok(hook.run(&request, response).headers)
	}

	#[test]
	fn echoes_allowed_origin() -> Result
	{
		let hook = CorsPostHook::new(&config(&["localhost"]));
		let headers = run(&hook, &[("origin", "localhost"), ("cookie", "x")])?;

		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "localhost");
		assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
		assert_eq!(headers[header::VARY], "Origin");

		Ok(())
	}

	#[test]
	fn ignores_unknown_origin() -> Result
	{
		let hook = CorsPostHook::new(&config(&["localhost"]));
		let headers = run(&hook, &[("origin", "other")])?;

		assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
		assert!(!headers.contains_key(header::VARY));

		Ok(())
	}

	#[test]
	fn wildcard_with_cookie_echoes_origin() -> Result
	{
		let hook = CorsPostHook::new(&config(&["*"]));
		let with_cookie = run(&hook, &[("origin", "localhost"), ("cookie", "x")])?;
		let without_cookie = run(&hook, &[("origin", "localhost")])?;

		assert_eq!(with_cookie[header::ACCESS_CONTROL_ALLOW_ORIGIN], "localhost");
		assert_eq!(without_cookie[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
		assert!(!with_cookie.contains_key(header::VARY));

		Ok(())
	}

	#[test]
	fn no_origin_no_headers() -> Result
	{
		for origins in [&["*"][..], &["localhost"][..]] {
			let hook = CorsPostHook::new(&config(origins));
			let headers = run(&hook, &[("cookie", "x")])?;

			assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
			assert!(!headers.contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
		}

		Ok(())
	}

	#[test]
	fn vary_is_appended_once() -> Result
	{
		let mut headers = http::HeaderMap::new();
		headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));

		add_vary_origin(&mut headers);
		add_vary_origin(&mut headers);

		assert_eq!(headers[header::VARY], "Accept-Encoding, Origin");

		Ok(())
	}
}
