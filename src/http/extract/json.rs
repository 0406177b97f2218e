//! The [`Json`] [extractor].
//!
//! [extractor]: axum::extract

use {
	crate::exception::{Exception, HttpException, RequestValidationError, ValidationIssue},
	axum::{
		extract::{FromRequest, Request},
		response::{IntoResponse, Response},
	},
	bytes::Bytes,
	http::{HeaderMap, StatusCode, header},
	mime::Mime,
	serde_json::error::Category,
};

/// An extractor for JSON request bodies.
///
/// Bodies that fail to deserialize are rejected with a [`RequestValidationError`]; a missing
/// `Content-Type` is rejected with `415 Unsupported Media Type`.
///
/// This type also implements [`IntoResponse`], which means it can be returned from handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
	S: Send + Sync,
	T: for<'de> serde::Deserialize<'de>,
{
	type Rejection = Exception;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection>
	{
		if !has_json_content_type(req.headers()) {
			return Err(Exception::new(
				HttpException::new(StatusCode::UNSUPPORTED_MEDIA_TYPE)
					.with_detail("expected request with `Content-Type: application/json`"),
			));
		}

		let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
			let http = HttpException::new(rejection.status()).with_detail(rejection.body_text());
			Exception::new(http)
		})?;

		serde_json::from_slice::<T>(&bytes)
			.map(Self)
			.map_err(|error| Exception::new(validation_error(&error)))
	}
}

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response
	{
		axum::Json(self.0).into_response()
	}
}

fn validation_error(error: &serde_json::Error) -> RequestValidationError
{
	let message = error.to_string();
	let issue = match (error.classify(), super::missing_field(&message)) {
		(Category::Data, Some(field)) => {
			ValidationIssue::new("missing", ["body", field], "Field required")
		},
		(Category::Data, None) => ValidationIssue::new("value_error", ["body"], message),
		(Category::Syntax | Category::Eof | Category::Io, _) => {
			ValidationIssue::new("json_invalid", ["body"], message)
		},
	};

	RequestValidationError::new().with(&issue)
}

/// Checks if the given `headers` contain a `Content-Type` header with a JSON-related value.
fn has_json_content_type(headers: &HeaderMap) -> bool
{
	let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
		return false;
	};

	let Ok(content_type) = content_type.to_str() else {
		return false;
	};

	let Ok(mime) = content_type.parse::<Mime>() else {
		return false;
	};

	mime.type_() == "application"
		&& (mime.subtype() == "json" || mime.suffix().is_some_and(|name| name == "json"))
}

#[cfg(test)]
mod tests
{
	use {
		super::*,
		crate::testing::{Result, assert, assert_eq},
		http::HeaderValue,
		serde_json::json,
	};

	#[derive(Debug, serde::Deserialize)]
	#[expect(dead_code)]
	struct Body
	{
		name: String,
	}

	#[test]
	fn json_content_types() -> Result
	{
		let mut headers = HeaderMap::new();

		assert!(!has_json_content_type(&headers));

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
		assert!(has_json_content_type(&headers));

		headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
		assert!(!has_json_content_type(&headers));

		Ok(())
	}

	#[test]
	fn missing_fields_become_issues() -> Result
	{
		let Err(error) = serde_json::from_str::<Body>("{}") else {
			anyhow::bail!("empty object should not deserialize");
		};

		assert_eq!(
			validation_error(&error).errors(),
			&[json!({
				"type": "missing",
				"loc": ["body", "name"],
				"msg": "Field required",
				"input": null,
			})][..]
		);

		Ok(())
	}

	#[test]
	fn syntax_errors_become_issues() -> Result
	{
		let Err(error) = serde_json::from_str::<Body>("{") else {
			anyhow::bail!("truncated object should not deserialize");
		};

		let errors = validation_error(&error);

		assert_eq!(errors.errors()[0]["type"], "json_invalid");

		Ok(())
	}
}
