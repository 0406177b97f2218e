use {
	super::PostHook,
	crate::response::ProblemResponse,
	http::{StatusCode, request},
	std::collections::BTreeSet,
};

/// Removes every body member except `type`, `title`, `status` and `detail` from responses with
/// one of the configured status codes.
#[derive(Debug, Clone)]
pub struct StripExtrasPostHook
{
	enabled: bool,
	codes: BTreeSet<StatusCode>,
}

impl StripExtrasPostHook
{
	const KEPT_MEMBERS: [&str; 4] = ["type", "title", "status", "detail"];

	/// Creates a post-hook trimming responses with any of the given `codes`.
	pub fn new(enabled: bool, codes: impl IntoIterator<Item = StatusCode>) -> Self
	{
		Self { enabled, codes: codes.into_iter().collect() }
	}
}

impl PostHook for StripExtrasPostHook
{
	fn run(&self, _: &request::Parts, mut response: ProblemResponse) -> ProblemResponse
	{
		if self.enabled && self.codes.contains(&response.status) {
			response.body.retain(|key, _| Self::KEPT_MEMBERS.contains(&key.as_str()));
		}

		response
	}
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{self, Result, assert, assert_eq},
		serde_json::{Value, json},
	};

	fn body() -> serde_json::Map<String, Value>
	{
		match json!({
			"type": "request-validation-failed",
			"title": "Request validation error.",
			"status": 422,
			"errors": [],
		}) {
			Value::Object(body) => body,
			_ => serde_json::Map::new(),
		}
	}

	#[test]
	fn strips_configured_codes() -> Result
	{
		let request = testing::request_parts("/", &[])?;
		let hook = StripExtrasPostHook::new(true, [StatusCode::UNPROCESSABLE_ENTITY]);

		let response = ProblemResponse::new(StatusCode::UNPROCESSABLE_ENTITY, body());
		let stripped = hook.run(&request, response);
		let untouched = hook.run(&request, ProblemResponse::new(StatusCode::BAD_REQUEST, body()));

		assert!(!stripped.body.contains_key("errors"));
		assert_eq!(stripped.body.len(), 3);
		assert!(untouched.body.contains_key("errors"));

		Ok(())
	}

	#[test]
	fn disabled_does_nothing() -> Result
	{
		let request = testing::request_parts("/", &[])?;
		let hook = StripExtrasPostHook::new(false, [StatusCode::UNPROCESSABLE_ENTITY]);
		let response = ProblemResponse::new(StatusCode::UNPROCESSABLE_ENTITY, body());
		let response = hook.run(&request, response);

		assert!(response.body.contains_key("errors"));

		Ok(())
	}
}
