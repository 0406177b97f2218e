//! The [`Query`] [extractor].
//!
//! [extractor]: axum::extract

use {
	crate::exception::{Exception, RequestValidationError, ValidationIssue},
	axum::extract::FromRequestParts,
	http::request,
};

/// An extractor for URI query parameters.
///
/// Query strings that fail to deserialize are rejected with a [`RequestValidationError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

impl<S, T> FromRequestParts<S> for Query<T>
where
	S: Send + Sync,
	T: serde::de::DeserializeOwned,
{
	type Rejection = Exception;

	async fn from_request_parts(parts: &mut request::Parts, _: &S) -> Result<Self, Self::Rejection>
	{
		let query = parts.uri.query().unwrap_or_default();

		serde_urlencoded::from_str::<T>(query)
			.map(Self)
			.map_err(|error| Exception::new(validation_error(&error.to_string(), query)))
	}
}

fn validation_error(message: &str, query: &str) -> RequestValidationError
{
	let issue = match super::missing_field(message) {
		Some(field) => ValidationIssue::new("missing", ["query", field], "Field required"),
		None => ValidationIssue::new("value_error", ["query"], message)
			.with_input(serde_json::Value::from(query)),
	};

	RequestValidationError::new().with(&issue)
}
